//! Application layer services implementing business logic.
//!
//! Services coordinate validation, storage and caching, and expose a small
//! API to the HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::alias_service::AliasService`] - Publishing, editing and bulk transfer of the alias map
//! - [`services::alias_store::AliasStore`] - Primary and backup storage with automatic recovery
//! - [`services::auth_service::AuthService`] - Admin bearer token authentication

pub mod services;
