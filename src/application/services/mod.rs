//! Business logic services for the application layer.

pub mod alias_service;
pub mod alias_store;
pub mod auth_service;

pub use alias_service::{AliasService, SaveOutcome};
pub use alias_store::AliasStore;
pub use auth_service::AuthService;
