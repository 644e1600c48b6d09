//! Handlers for alias map administration (edit, import, export, purge).

use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::{Field, MultipartError},
        rejection::QueryRejection,
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::aliases::{MessageResponse, SaveAliasesRequest, SaveAliasesResponse};
use crate::api::dto::transfer::ExportQuery;
use crate::application::services::SaveOutcome;
use crate::domain::entities::AliasMap;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::alias_codec::TransferFormat;

/// Returns the stored alias map without the publish filter.
///
/// # Endpoint
///
/// `GET /admin/aliases`
///
/// Reads through the alias store, so an empty primary map is recovered from
/// the backup before it is returned.
///
/// # Errors
///
/// Returns 500 Internal Server Error on storage errors.
pub async fn get_aliases_handler(
    State(state): State<AppState>,
) -> Result<Json<AliasMap>, AppError> {
    Ok(Json(state.alias_service.current().await?))
}

/// Replaces the whole alias map.
///
/// # Endpoint
///
/// `PUT /admin/aliases`
///
/// # Request Body
///
/// ```json
/// {
///   "aliases": [
///     {"address": "help@acme.com", "destinations": ["agent1@acme.com", "agent2@acme.com"]}
///   ]
/// }
/// ```
///
/// The map shape `{"aliases": {"help@acme.com": ["agent1@acme.com"]}}` is
/// accepted as well. Invalid entries are dropped and counted in `dropped`.
///
/// # Errors
///
/// Returns 400 Bad Request if `aliases` is neither an object nor an array.
pub async fn save_aliases_handler(
    State(state): State<AppState>,
    Json(payload): Json<SaveAliasesRequest>,
) -> Result<Json<SaveAliasesResponse>, AppError> {
    payload.validate()?;

    let outcome = state.alias_service.save(&payload.aliases).await?;

    Ok(Json(saved_response("Aliases saved", outcome)))
}

/// Replaces the alias map with the content of an uploaded file.
///
/// # Endpoint
///
/// `POST /admin/import` (`multipart/form-data`)
///
/// # Form Fields
///
/// - `file`: the JSON or CSV export to import
/// - `format` (optional): `json` (default) or `csv`
///
/// Nothing is stored unless the whole file decodes.
///
/// # Errors
///
/// - 400 Bad Request: no file, empty file, or unknown format
/// - 413 Payload Too Large: file exceeds `MAX_IMPORT_BYTES`
/// - 422 Unprocessable Entity: file content cannot be decoded
pub async fn import_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SaveAliasesResponse>, AppError> {
    let mut file = None;
    let mut format = TransferFormat::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => file = Some(read_limited(field, state.max_import_bytes).await?),
            Some("format") => {
                let value = field.text().await.map_err(multipart_error)?;
                if !value.trim().is_empty() {
                    format = value.parse()?;
                }
            }
            _ => {}
        }
    }

    let bytes = file.ok_or_else(|| {
        AppError::bad_request("No file uploaded", json!({"field": "file"}))
    })?;
    if bytes.is_empty() {
        return Err(AppError::bad_request(
            "Uploaded file is empty",
            json!({"field": "file"}),
        ));
    }

    let outcome = state.alias_service.import(format, &bytes).await?;

    Ok(Json(saved_response("Aliases imported", outcome)))
}

/// Downloads the stored alias map.
///
/// # Endpoint
///
/// `GET /admin/export?format=json|csv`
///
/// # Response Headers
///
/// - `Content-Type`: `application/json` or `text/csv; charset=utf-8`
/// - `Content-Disposition`: `attachment; filename="email-aliases-YYYY-MM-DD.<ext>"`
/// - `Cache-Control`: `no-cache, no-store, must-revalidate`
///
/// # Errors
///
/// Returns 400 Bad Request for an unknown format.
pub async fn export_handler(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|e| {
        AppError::bad_request(
            "Unsupported export format",
            json!({"reason": e.body_text(), "supported": ["json", "csv"]}),
        )
    })?;

    let file = state.alias_service.export(query.format()).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::CACHE_CONTROL,
                "no-cache, no-store, must-revalidate".to_string(),
            ),
        ],
        file.body,
    )
        .into_response())
}

/// Removes the alias map, its backup and the cache entry.
///
/// # Endpoint
///
/// `DELETE /admin/aliases`
pub async fn purge_handler(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    state.alias_service.purge().await?;

    Ok(Json(MessageResponse {
        message: "All alias data removed".to_string(),
    }))
}

fn saved_response(message: &str, outcome: SaveOutcome) -> SaveAliasesResponse {
    SaveAliasesResponse {
        message: format!("{message} ({} stored, {} dropped)", outcome.map.len(), outcome.dropped),
        data: outcome.map,
        dropped: outcome.dropped,
    }
}

/// Reads a multipart field, failing once it exceeds `limit` bytes.
async fn read_limited(mut field: Field<'_>, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::payload_too_large(
            "Import file too large",
            json!({"reason": e.body_text()}),
        );
    }

    AppError::bad_request("Invalid multipart body", json!({"reason": e.body_text()}))
}

fn too_large(limit: usize) -> AppError {
    AppError::payload_too_large("Import file too large", json!({"max_bytes": limit}))
}
