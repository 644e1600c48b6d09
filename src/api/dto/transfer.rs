//! DTOs for import and export endpoints.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::utils::alias_codec::TransferFormat;

/// Query parameters of `GET /admin/export`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub format: Option<TransferFormat>,
}

impl ExportQuery {
    pub fn format(&self) -> TransferFormat {
        self.format.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_defaults_to_json() {
        let query: ExportQuery = serde_json::from_str("{}").unwrap();

        assert_eq!(query.format(), TransferFormat::Json);
    }

    #[test]
    fn test_format_is_parsed_from_string() {
        let query: ExportQuery = serde_json::from_str(r#"{"format": "CSV"}"#).unwrap();

        assert_eq!(query.format(), TransferFormat::Csv);
    }

    #[test]
    fn test_unknown_format_is_error() {
        assert!(serde_json::from_str::<ExportQuery>(r#"{"format": "xml"}"#).is_err());
    }
}
