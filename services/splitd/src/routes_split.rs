use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Query;
use serde::{Deserialize, Deserializer};

use stratify::{execute_split, SplitKind, SplitRequest};

use crate::errors::{internal, split_error_response, ApiError};
use crate::pg_store::PgDatasetStore;
use crate::state::SharedState;

/// Query parameters for the full training/fusion/test split routes.
/// `include_attributes` / `exclude_attributes` are repeatable.
#[derive(Debug, Deserialize)]
pub struct SplitParams {
    pub training_rate: f64,
    #[serde(default)]
    pub fusion_rate: f64,
    pub class_attribute: String,
    #[serde(default)]
    pub include_attributes: Vec<String>,
    #[serde(default)]
    pub exclude_attributes: Vec<String>,
    #[serde(default)]
    pub attributes_rate: f64,
    pub random_seed: i64,
    #[serde(default, deserialize_with = "flag")]
    pub include_header: bool,
}

#[derive(Debug, Deserialize)]
pub struct SampleParams {
    pub training_rate: f64,
    pub sample_rate: f64,
    pub sample_number: u64,
    pub class_attribute: String,
    #[serde(default)]
    pub include_attributes: Vec<String>,
    #[serde(default)]
    pub exclude_attributes: Vec<String>,
    #[serde(default)]
    pub attributes_rate: f64,
    pub random_seed: i64,
    #[serde(default, deserialize_with = "flag")]
    pub include_header: bool,
}

/// Query parameters for the class-column-only routes.
#[derive(Debug, Deserialize)]
pub struct ClassParams {
    pub training_rate: f64,
    #[serde(default)]
    pub fusion_rate: f64,
    pub class_attribute: String,
    pub random_seed: i64,
    #[serde(default, deserialize_with = "flag")]
    pub include_header: bool,
}

#[derive(Debug, Deserialize)]
pub struct SampleClassParams {
    pub training_rate: f64,
    pub sample_rate: f64,
    pub sample_number: u64,
    pub class_attribute: String,
    pub random_seed: i64,
    #[serde(default, deserialize_with = "flag")]
    pub include_header: bool,
}

pub async fn get_training_split(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<SplitParams>,
) -> Result<Response, ApiError> {
    let mut request = split_request(name, SplitKind::Training, params);
    request.fusion_rate = 0.0;
    run_split(state, request).await
}

pub async fn get_fusion_split(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<SplitParams>,
) -> Result<Response, ApiError> {
    run_split(state, split_request(name, SplitKind::Fusion, params)).await
}

pub async fn get_test_split(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<SplitParams>,
) -> Result<Response, ApiError> {
    run_split(state, split_request(name, SplitKind::Test, params)).await
}

pub async fn get_training_sample(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<SampleParams>,
) -> Result<Response, ApiError> {
    run_split(state, sample_request(name, params)).await
}

pub async fn get_training_split_class(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<ClassParams>,
) -> Result<Response, ApiError> {
    let mut request = class_request(name, SplitKind::Training, params);
    request.fusion_rate = 0.0;
    run_split(state, request).await
}

pub async fn get_fusion_split_class(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<ClassParams>,
) -> Result<Response, ApiError> {
    run_split(state, class_request(name, SplitKind::Fusion, params)).await
}

pub async fn get_test_split_class(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<ClassParams>,
) -> Result<Response, ApiError> {
    run_split(state, class_request(name, SplitKind::Test, params)).await
}

pub async fn get_training_sample_class(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<SampleClassParams>,
) -> Result<Response, ApiError> {
    let request = SplitRequest {
        dataset: name,
        kind: SplitKind::TrainingSample,
        training_rate: params.training_rate,
        fusion_rate: 0.0,
        sample_rate: params.sample_rate,
        sample_number: params.sample_number,
        class_attribute: params.class_attribute,
        include_attributes: vec![],
        exclude_attributes: vec![],
        attributes_rate: 0.0,
        random_seed: params.random_seed,
        include_header: params.include_header,
        class_only: true,
    };
    run_split(state, request).await
}

fn split_request(dataset: String, kind: SplitKind, params: SplitParams) -> SplitRequest {
    SplitRequest {
        dataset,
        kind,
        training_rate: params.training_rate,
        fusion_rate: params.fusion_rate,
        sample_rate: 0.0,
        sample_number: 0,
        class_attribute: params.class_attribute,
        include_attributes: params.include_attributes,
        exclude_attributes: params.exclude_attributes,
        attributes_rate: params.attributes_rate,
        random_seed: params.random_seed,
        include_header: params.include_header,
        class_only: false,
    }
}

fn sample_request(dataset: String, params: SampleParams) -> SplitRequest {
    SplitRequest {
        dataset,
        kind: SplitKind::TrainingSample,
        training_rate: params.training_rate,
        fusion_rate: 0.0,
        sample_rate: params.sample_rate,
        sample_number: params.sample_number,
        class_attribute: params.class_attribute,
        include_attributes: params.include_attributes,
        exclude_attributes: params.exclude_attributes,
        attributes_rate: params.attributes_rate,
        random_seed: params.random_seed,
        include_header: params.include_header,
        class_only: false,
    }
}

fn class_request(dataset: String, kind: SplitKind, params: ClassParams) -> SplitRequest {
    SplitRequest {
        dataset,
        kind,
        training_rate: params.training_rate,
        fusion_rate: params.fusion_rate,
        sample_rate: 0.0,
        sample_number: 0,
        class_attribute: params.class_attribute,
        include_attributes: vec![],
        exclude_attributes: vec![],
        attributes_rate: 0.0,
        random_seed: params.random_seed,
        include_header: params.include_header,
        class_only: true,
    }
}

/// Runs one split on a dedicated pooled connection. The CSV is buffered
/// server-side and only handed to the client once the whole split
/// succeeded, so a mid-split failure never delivers a truncated file.
async fn run_split(state: SharedState, request: SplitRequest) -> Result<Response, ApiError> {
    let conn = state.pool.acquire().await.map_err(internal)?;
    let mut store = PgDatasetStore::new(conn);

    let mut sink = Vec::new();
    execute_split(&mut store, &request, &mut sink)
        .await
        .map_err(split_error_response)?;

    Ok(([(header::CONTENT_TYPE, "text/csv")], sink).into_response())
}

/// Accepts the boolean spellings clients actually send.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.as_str() {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean '{other}'"
        ))),
    }
}
