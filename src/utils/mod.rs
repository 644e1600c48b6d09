//! Helpers shared by the service and the admin CLI.
//!
//! - [`email_normalizer`] - Address normalization and validation
//! - [`alias_codec`] - JSON/CSV import and export of alias maps

pub mod alias_codec;
pub mod email_normalizer;
