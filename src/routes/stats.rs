use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::stats::Dashboard, error::AppResult, middleware::auth::AuthUser, response::ApiResponse,
    services::stats_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Inventory dashboard", body = ApiResponse<Dashboard>)
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<Dashboard>>> {
    let resp = stats_service::dashboard(&state).await?;
    Ok(Json(resp))
}
