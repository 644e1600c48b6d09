//! Domain layer containing the alias data model and its validation rules.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures ([`entities::AliasMap`])
//! - [`alias_validator`] - Normalization of untrusted input into an alias map
//! - [`repositories`] - Storage trait definitions
//!
//! # Write Flow
//!
//! 1. Admin action (save or import) produces raw JSON input
//! 2. [`alias_validator::normalize`] drops invalid entries
//! 3. [`crate::application::services::AliasStore`] persists primary and backup copies
//! 4. The published cache entry is invalidated

pub mod alias_validator;
pub mod entities;
pub mod repositories;
