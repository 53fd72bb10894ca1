mod config;
mod errors;
mod pg_store;
mod routes_dataset;
mod routes_split;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;

    let pool = PgPool::connect(&cfg.database_url)
        .await
        .context("Failed to connect to Postgres")?;

    // Startup health check (fail fast)
    check_postgres(&pool).await?;
    info!("postgres: ok");

    let app_state = Arc::new(AppState { pool });

    let app = Router::new()
        .route("/dataset", post(routes_dataset::post_dataset))
        .route("/dataset/:name", delete(routes_dataset::delete_dataset))
        .route(
            "/dataset/:name/split/training",
            get(routes_split::get_training_split),
        )
        .route(
            "/dataset/:name/split/training/class",
            get(routes_split::get_training_split_class),
        )
        .route(
            "/dataset/:name/split/training/sample",
            get(routes_split::get_training_sample),
        )
        .route(
            "/dataset/:name/split/training/sample/class",
            get(routes_split::get_training_sample_class),
        )
        .route(
            "/dataset/:name/split/fusion",
            get(routes_split::get_fusion_split),
        )
        .route(
            "/dataset/:name/split/fusion/class",
            get(routes_split::get_fusion_split_class),
        )
        .route(
            "/dataset/:name/split/test",
            get(routes_split::get_test_split),
        )
        .route(
            "/dataset/:name/split/test/class",
            get(routes_split::get_test_split_class),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = &cfg.bind_addr;
    info!("splitd listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn check_postgres(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Postgres ping failed")?;
    Ok(())
}
