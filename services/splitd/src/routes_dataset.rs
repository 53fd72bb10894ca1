use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::info;

use stratify::{ident, Attribute, DatasetStore};

use crate::errors::{bad_request, internal, split_error_response, ApiError};
use crate::pg_store::PgDatasetStore;
use crate::state::SharedState;

pub async fn post_dataset(
    State(state): State<SharedState>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let mut name: Option<String> = None;
    let mut attributes: Option<Vec<Attribute>> = None;
    let mut delimiter: Option<String> = None;
    let mut header: Option<bool> = None;
    let mut file_bytes: Option<bytes::Bytes> = None;

    while let Some(field) = mp.next_field().await.map_err(bad_request)? {
        match field.name() {
            Some("name") => name = Some(field.text().await.map_err(bad_request)?),
            Some("attributes") => {
                let raw = field.text().await.map_err(bad_request)?;
                attributes = Some(serde_json::from_str(&raw).map_err(bad_request)?);
            }
            Some("delimiter") => delimiter = Some(field.text().await.map_err(bad_request)?),
            Some("header") => {
                let raw = field.text().await.map_err(bad_request)?;
                header = Some(parse_flag(&raw).ok_or_else(|| bad_request(format!("invalid header flag '{raw}'")))?);
            }
            Some("dataset") => file_bytes = Some(field.bytes().await.map_err(bad_request)?),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| bad_request("Missing field: name"))?;
    let attributes = attributes.ok_or_else(|| bad_request("Missing field: attributes"))?;
    let delimiter = delimiter.ok_or_else(|| bad_request("Missing field: delimiter"))?;
    let header = header.ok_or_else(|| bad_request("Missing field: header"))?;
    let file_bytes = file_bytes.ok_or_else(|| bad_request("Missing field: dataset"))?;

    let delimiter = ident::validate_delimiter(&delimiter).map_err(split_error_response)?;

    let conn = state.pool.acquire().await.map_err(internal)?;
    let mut store = PgDatasetStore::new(conn);

    // Replace semantics: drop, recreate, fill. The sequence is not
    // atomic; a crash in between can leave the dataset missing or
    // partially filled, and the caller is expected to re-upload.
    store.destroy_dataset(&name).await.map_err(split_error_response)?;
    store
        .create_dataset(&name, &attributes)
        .await
        .map_err(split_error_response)?;
    store
        .bulk_load(&name, delimiter, header, &file_bytes)
        .await
        .map_err(split_error_response)?;

    info!(dataset = %name, bytes = file_bytes.len(), "dataset uploaded");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "ok", "dataset": name })),
    ))
}

pub async fn delete_dataset(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.pool.acquire().await.map_err(internal)?;
    let mut store = PgDatasetStore::new(conn);
    store.destroy_dataset(&name).await.map_err(split_error_response)?;

    info!(dataset = %name, "dataset deleted");
    Ok(Json(json!({ "status": "ok", "dataset": name })))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "1" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("yes"), None);
    }
}
