use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use stratify::SplitError;

pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn bad_request(msg: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": msg.to_string() })),
    )
}

pub fn internal(msg: impl ToString) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": msg.to_string() })),
    )
}

pub fn split_error_response(err: SplitError) -> ApiError {
    let status = match &err {
        SplitError::Validation(_) => StatusCode::BAD_REQUEST,
        SplitError::Schema(_) => StatusCode::NOT_FOUND,
        SplitError::Store(_) | SplitError::PartialWrite { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() })))
}
