//! Normalization of untrusted alias input into a well-formed [`AliasMap`].
//!
//! Input arrives as an arbitrary JSON structure from a form submission or an
//! uploaded file. Two shapes are understood:
//!
//! - **Map shape**: `{"alias@x.com": ["dest@y.com", ...], ...}`
//! - **Entry-list shape**: `[{"address": "alias@x.com", "destinations": ["dest@y.com"]}, ...]`
//!
//! Invalid entries are dropped rather than failing the whole operation; the
//! number of dropped entries is reported back to the caller.

use serde_json::Value;
use tracing::debug;

use crate::domain::entities::{AliasEntry, AliasMap};
use crate::utils::email_normalizer::{normalize_alias, normalize_destination};

/// Result of normalizing raw alias input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub map: AliasMap,
    /// Number of candidate entries that were discarded.
    pub dropped: usize,
}

/// Normalizes raw alias input.
///
/// For each candidate entry:
/// 1. The alias is trimmed, lower-cased and validated; invalid aliases drop the entry
/// 2. The destination list is filtered down to valid addresses (duplicates removed)
/// 3. Entries left with no destinations are dropped
/// 4. The entry is inserted keyed by the normalized alias; later duplicates win
///
/// Input that is neither an object nor an array yields an empty map.
pub fn normalize(raw: &Value) -> Normalized {
    let mut out = Normalized::default();

    match raw {
        Value::Object(entries) => {
            for (alias, destinations) in entries {
                accept(&mut out, Some(alias.as_str()), destinations);
            }
        }
        Value::Array(entries) => {
            for item in entries {
                let alias = item.get("address").and_then(Value::as_str);
                let destinations = item.get("destinations").unwrap_or(&Value::Null);
                accept(&mut out, alias, destinations);
            }
        }
        other => {
            debug!(kind = value_kind(other), "Ignoring non-structured alias input");
        }
    }

    out
}

fn accept(out: &mut Normalized, alias: Option<&str>, destinations: &Value) {
    match build_entry(alias, destinations) {
        Some(entry) => {
            out.map.insert(entry);
        }
        None => out.dropped += 1,
    }
}

fn build_entry(alias: Option<&str>, destinations: &Value) -> Option<AliasEntry> {
    let alias = normalize_alias(alias?).ok()?;

    let mut clean: Vec<String> = Vec::new();
    for candidate in destinations.as_array()? {
        let Some(address) = candidate.as_str() else {
            continue;
        };
        if let Ok(address) = normalize_destination(address)
            && !clean.contains(&address)
        {
            clean.push(address);
        }
    }

    if clean.is_empty() {
        debug!(alias = %alias, "Dropping alias without valid destinations");
        return None;
    }

    Some(AliasEntry {
        alias,
        destinations: clean,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn destinations(map: &AliasMap, alias: &str) -> Vec<String> {
        map.get(alias).map(|d| d.to_vec()).unwrap_or_default()
    }

    #[test]
    fn test_map_shape() {
        let result = normalize(&json!({
            "help@acme.com": ["agent1@acme.com", "agent2@acme.com"]
        }));

        assert_eq!(result.dropped, 0);
        assert_eq!(
            destinations(&result.map, "help@acme.com"),
            vec!["agent1@acme.com", "agent2@acme.com"]
        );
    }

    #[test]
    fn test_entry_list_shape() {
        let result = normalize(&json!([
            { "address": "shop@acme.com", "destinations": ["buyer@acme.com"] },
            { "address": "info@acme.com", "destinations": ["a@acme.com", "b@acme.com"] }
        ]));

        assert_eq!(result.dropped, 0);
        assert_eq!(result.map.len(), 2);
        assert_eq!(
            destinations(&result.map, "shop@acme.com"),
            vec!["buyer@acme.com"]
        );
    }

    #[test]
    fn test_invalid_alias_is_dropped() {
        let result = normalize(&json!({
            "not-an-address": ["a@acme.com"],
            "ok@acme.com": ["a@acme.com"]
        }));

        assert_eq!(result.dropped, 1);
        assert_eq!(result.map.len(), 1);
        assert!(result.map.get("not-an-address").is_none());
    }

    #[test]
    fn test_invalid_destinations_are_filtered() {
        let result = normalize(&json!({
            "ok@acme.com": ["bad", "good@acme.com", 42, null, "  good@acme.com "]
        }));

        assert_eq!(result.dropped, 0);
        assert_eq!(destinations(&result.map, "ok@acme.com"), vec!["good@acme.com"]);
    }

    #[test]
    fn test_entry_without_valid_destinations_is_dropped() {
        let result = normalize(&json!({
            "a@acme.com": ["bad", ""],
            "b@acme.com": [],
            "c@acme.com": "d@acme.com"
        }));

        assert_eq!(result.dropped, 3);
        assert!(result.map.is_empty());
    }

    #[test]
    fn test_entry_list_missing_fields_are_dropped() {
        let result = normalize(&json!([
            { "destinations": ["a@acme.com"] },
            { "address": "b@acme.com" },
            "c@acme.com",
            { "address": 7, "destinations": ["a@acme.com"] }
        ]));

        assert_eq!(result.dropped, 4);
        assert!(result.map.is_empty());
    }

    #[test]
    fn test_alias_is_lowercased_and_last_duplicate_wins() {
        let result = normalize(&json!([
            { "address": "Sales@Acme.com", "destinations": ["first@acme.com"] },
            { "address": "sales@acme.com ", "destinations": ["second@acme.com"] }
        ]));

        assert_eq!(result.map.len(), 1);
        assert_eq!(
            destinations(&result.map, "sales@acme.com"),
            vec!["second@acme.com"]
        );
    }

    #[test]
    fn test_scalar_input_yields_empty_map() {
        assert!(normalize(&json!("text")).map.is_empty());
        assert!(normalize(&Value::Null).map.is_empty());
        assert_eq!(normalize(&json!(12)).dropped, 0);
    }
}
