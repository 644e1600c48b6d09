//! Alias entities: a single alias entry and the full published alias map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A validated alias address together with its destination addresses.
///
/// Constructed by [`crate::domain::alias_validator`]; the alias is already
/// lower-cased and the destination list is non-empty and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub alias: String,
    pub destinations: Vec<String>,
}

/// The complete alias → destinations dataset.
///
/// Serializes as a plain JSON object mapping each alias to an array of
/// destination strings, which is also the wire format of the public read API:
///
/// ```json
/// {"sales@example.com": ["alice@example.com", "bob@example.com"]}
/// ```
///
/// Keys are kept sorted so that repeated serializations of the same map are
/// byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap(BTreeMap<String, Vec<String>>);

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any previous destinations for the same alias.
    pub fn insert(&mut self, entry: AliasEntry) -> Option<Vec<String>> {
        self.0.insert(entry.alias, entry.destinations)
    }

    pub fn get(&self, alias: &str) -> Option<&[String]> {
        self.0.get(alias).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl FromIterator<AliasEntry> for AliasMap {
    fn from_iter<I: IntoIterator<Item = AliasEntry>>(iter: I) -> Self {
        let mut map = AliasMap::new();
        for entry in iter {
            map.insert(entry);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(alias: &str, destinations: &[&str]) -> AliasEntry {
        AliasEntry {
            alias: alias.to_string(),
            destinations: destinations.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_insert_replaces_existing_alias() {
        let mut map = AliasMap::new();
        assert!(map.insert(entry("a@x.com", &["b@y.com"])).is_none());

        let previous = map.insert(entry("a@x.com", &["c@y.com"]));

        assert_eq!(previous, Some(vec!["b@y.com".to_string()]));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a@x.com"), Some(&["c@y.com".to_string()][..]));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let map: AliasMap = [
            entry("sales@example.com", &["alice@example.com", "bob@example.com"]),
            entry("help@example.com", &["carol@example.com"]),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&map).unwrap();

        assert_eq!(
            json,
            r#"{"help@example.com":["carol@example.com"],"sales@example.com":["alice@example.com","bob@example.com"]}"#
        );
    }

    #[test]
    fn test_deserializes_from_plain_object() {
        let map: AliasMap = serde_json::from_str(r#"{"a@x.com":["b@y.com"]}"#).unwrap();

        assert_eq!(map.get("a@x.com"), Some(&["b@y.com".to_string()][..]));
        assert!(!map.is_empty());
    }

    #[test]
    fn test_rejects_non_map_document() {
        assert!(serde_json::from_str::<AliasMap>(r#"["a@x.com"]"#).is_err());
        assert!(serde_json::from_str::<AliasMap>(r#"{"a@x.com":"b@y.com"}"#).is_err());
    }
}
