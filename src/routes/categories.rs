use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::categories::{CategoryList, CategoryRequest, SeedResult},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::CategoryQuery,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/defaults", post(initialize_defaults))
        .route("/{id}", put(update_category).delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Categories in display order", body = ApiResponse<CategoryList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 422, description = "Invalid form fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/categories/defaults",
    responses(
        (status = 200, description = "Seed the default categories into an empty cache", body = ApiResponse<SeedResult>)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn initialize_defaults(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<SeedResult>>> {
    let resp = category_service::initialize_defaults(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state, &user, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Deleted category"),
        (status = 400, description = "Category still has products"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = category_service::delete_category(&state, &user, &id).await?;
    Ok(Json(resp))
}
