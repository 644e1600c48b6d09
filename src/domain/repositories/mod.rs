//! Repository trait definitions for the domain layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`SettingsRepository`] - Persistent key-value settings store
//!
//! # Testing
//!
//! See integration tests in `tests/repository_settings.rs` for usage examples.

pub mod settings_repository;

pub use settings_repository::SettingsRepository;

#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
