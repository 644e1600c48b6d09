//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod admin;
pub mod aliases;
pub mod health;

pub use admin::{
    export_handler, get_aliases_handler, import_handler, purge_handler, save_aliases_handler,
};
pub use aliases::aliases_handler;
pub use health::health_handler;
