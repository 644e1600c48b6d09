//! Core domain entities representing the alias data model.
//!
//! # Entity Types
//!
//! - [`AliasEntry`] - A single validated alias with its destinations
//! - [`AliasMap`] - The complete published alias dataset
//!
//! Entities are plain data structures; validation lives in
//! [`crate::domain::alias_validator`].

pub mod alias;

pub use alias::{AliasEntry, AliasMap};
