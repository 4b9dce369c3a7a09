pub mod blob;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod local;
pub mod middleware;
pub mod models;
pub mod remote;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
pub mod viewmodels;

use axum::{Json, Router, http::{StatusCode, Uri}, routing::get};
use tower_http::services::ServeDir;

use crate::{
    response::{ApiResponse, Meta},
    routes::{create_api_router, doc::scalar_docs, health},
    state::AppState,
};

/// All routes bound to `state`, without the outer middleware stack.
pub fn build_app(state: AppState, media_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .nest_service("/media", ServeDir::new(media_dir))
        .merge(scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
