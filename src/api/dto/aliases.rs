//! DTOs for alias map endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::domain::entities::AliasMap;

/// Request to replace the whole alias map.
///
/// `aliases` accepts either shape understood by the validator:
///
/// ```json
/// {"aliases": {"sales@example.com": ["alice@example.com"]}}
/// {"aliases": [{"address": "sales@example.com", "destinations": ["alice@example.com"]}]}
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct SaveAliasesRequest {
    #[validate(custom(function = "validate_alias_payload"))]
    pub aliases: Value,
}

fn validate_alias_payload(value: &Value) -> Result<(), ValidationError> {
    if value.is_object() || value.is_array() {
        return Ok(());
    }

    Err(ValidationError::new("alias_payload")
        .with_message("aliases must be an object or an array of entries".into()))
}

/// Result of a save or import.
#[derive(Debug, Serialize)]
pub struct SaveAliasesResponse {
    pub message: String,
    pub data: AliasMap,
    /// Number of input entries discarded by validation.
    pub dropped: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
