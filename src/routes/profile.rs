use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};

use crate::{
    dto::profile::{ProfileImageRequest, UpdateProfileRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::UserProfile,
    response::ApiResponse,
    services::profile_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/image", put(set_profile_image))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Signed-in user's profile", body = ApiResponse<UserProfile>),
        (status = 404, description = "No profile yet"),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = profile_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserProfile>),
        (status = 422, description = "Invalid form fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = profile_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile/image",
    request_body = ProfileImageRequest,
    responses(
        (status = 200, description = "Profile picture path stored locally", body = ApiResponse<UserProfile>),
        (status = 404, description = "No profile yet"),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn set_profile_image(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProfileImageRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = profile_service::set_profile_image(&state, &user, payload).await?;
    Ok(Json(resp))
}
