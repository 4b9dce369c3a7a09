use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::sync::SyncReport, error::AppResult, middleware::auth::AuthUser, response::ApiResponse,
    services::sync_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(sync_from_cloud))
}

#[utoipa::path(
    post,
    path = "/api/sync",
    responses(
        (status = 200, description = "Cache refreshed from the remote store", body = ApiResponse<SyncReport>),
        (status = 502, description = "Remote store unavailable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sync"
)]
pub async fn sync_from_cloud(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<SyncReport>>> {
    let resp = sync_service::sync_all(&state).await?;
    Ok(Json(resp))
}
