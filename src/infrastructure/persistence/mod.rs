//! Settings store implementations.
//!
//! Concrete implementations of [`crate::domain::repositories::SettingsRepository`].
//!
//! # Repositories
//!
//! - [`PgSettingsRepository`] - PostgreSQL `settings` table with JSONB values
//! - [`MemorySettingsRepository`] - Process-local map for tests and ephemeral deployments

pub mod memory_settings_repository;
pub mod pg_settings_repository;

pub use memory_settings_repository::MemorySettingsRepository;
pub use pg_settings_repository::PgSettingsRepository;
