//! Import/export codec for alias maps.
//!
//! Two serialized forms are supported:
//!
//! - **JSON** (`application/json`): the alias map as an indented object,
//!   identical in shape to the public read API.
//! - **CSV** (`text/csv`): a header row `Alias,Destinations` followed by one row
//!   per alias, with destinations joined by `", "` into a single cell.
//!
//! # CSV Limitation
//!
//! Destinations are split on `,` when importing, so an address that itself
//! contains a comma does not survive a CSV round trip. Use JSON for lossless
//! transfer.
//!
//! Decoding never validates addresses; the decoded structure is handed to
//! [`crate::domain::alias_validator::normalize`] like any other raw input.

use chrono::NaiveDate;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::domain::entities::AliasMap;

const CSV_HEADER: [&str; 2] = ["Alias", "Destinations"];
const CSV_DESTINATION_SEPARATOR: &str = ", ";

/// Errors produced while encoding or decoding alias files.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Unsupported format '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("Invalid JSON format: expected an object or an array")]
    NotStructured,

    #[error("Could not read CSV data: {0}")]
    InvalidCsv(String),

    #[error("Failed to write export: {0}")]
    Write(String),
}

/// Serialized form of an alias map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferFormat {
    #[default]
    Json,
    Csv,
}

impl TransferFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TransferFormat::Json => "json",
            TransferFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            TransferFormat::Json => "application/json",
            TransferFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl FromStr for TransferFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(TransferFormat::Json),
            "csv" => Ok(TransferFormat::Csv),
            other => Err(CodecError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for TransferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered export ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Builds the suggested download name, e.g. `email-aliases-2025-03-14.csv`.
pub fn export_filename(format: TransferFormat, date: NaiveDate) -> String {
    format!(
        "email-aliases-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Encodes `map` and wraps it with its download metadata.
pub fn export_file(
    format: TransferFormat,
    map: &AliasMap,
    date: NaiveDate,
) -> Result<ExportFile, CodecError> {
    Ok(ExportFile {
        filename: export_filename(format, date),
        content_type: format.content_type(),
        body: encode(format, map)?,
    })
}

/// Serializes an alias map.
pub fn encode(format: TransferFormat, map: &AliasMap) -> Result<Vec<u8>, CodecError> {
    match format {
        TransferFormat::Json => {
            serde_json::to_vec_pretty(map).map_err(|e| CodecError::Write(e.to_string()))
        }
        TransferFormat::Csv => encode_csv(map),
    }
}

/// Parses an uploaded file into a raw alias structure.
///
/// # JSON
///
/// The document must be an object (map shape) or an array (entry-list shape);
/// anything else rejects the whole import.
///
/// # CSV
///
/// The first row is always discarded as a header. Every other row becomes one
/// entry: the second column is split on commas and each piece trimmed. Rows
/// with fewer than two columns or an empty first column are kept as entries
/// the validator rejects, so they show up in its dropped count. The result
/// uses the entry-list shape so that row order decides which duplicate wins.
pub fn decode(format: TransferFormat, bytes: &[u8]) -> Result<Value, CodecError> {
    match format {
        TransferFormat::Json => decode_json(bytes),
        TransferFormat::Csv => decode_csv(bytes),
    }
}

fn decode_json(bytes: &[u8]) -> Result<Value, CodecError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| CodecError::InvalidJson(e.to_string()))?;

    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        _ => Err(CodecError::NotStructured),
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Value, CodecError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut entries = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CodecError::InvalidCsv(e.to_string()))?;

        if index == 0 {
            continue;
        }

        let alias = record.get(0).unwrap_or_default();
        let Some(destinations) = record.get(1) else {
            debug!(row = index + 1, "CSV row has fewer than two columns");
            entries.push(json!({"address": alias, "destinations": []}));
            continue;
        };

        let destinations: Vec<&str> = destinations
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .collect();

        entries.push(json!({
            "address": alias,
            "destinations": destinations,
        }));
    }

    Ok(Value::Array(entries))
}

fn encode_csv(map: &AliasMap) -> Result<Vec<u8>, CodecError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| CodecError::Write(e.to_string()))?;

    for (alias, destinations) in map.iter() {
        let joined = destinations.join(CSV_DESTINATION_SEPARATOR);
        writer
            .write_record([alias.as_str(), joined.as_str()])
            .map_err(|e| CodecError::Write(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CodecError::Write(e.to_string()))
}
