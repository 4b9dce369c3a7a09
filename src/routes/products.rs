use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, patch, put},
};

use crate::{
    dto::products::{ProductList, ProductRequest, ProductView, StockAdjustRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low-stock", get(list_low_stock))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/stock", patch(adjust_stock))
        .route(
            "/{id}/image",
            put(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search name and description"),
        ("category_id" = Option<String>, Query, description = "Only this category"),
        ("available" = Option<bool>, Query, description = "Filter by availability flag"),
        ("status" = Option<String>, Query, description = "in_stock, low_stock or out_of_stock"),
    ),
    responses(
        (status = 200, description = "List cached products", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    responses(
        (status = 200, description = "Products at or below their threshold", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::low_stock(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<ProductView>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    let resp = product_service::get_product(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<ProductView>),
        (status = 422, description = "Invalid form fields"),
        (status = 502, description = "Remote store unavailable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductView>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<ProductView>),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid form fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductRequest>,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    let resp = product_service::update_product(&state, &user, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/stock",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = StockAdjustRequest,
    responses(
        (status = 200, description = "Adjusted stock", body = ApiResponse<ProductView>),
        (status = 400, description = "Stock would go negative"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustRequest>,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    let resp = product_service::adjust_stock(&state, &user, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/image",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body(content = Vec<u8>, content_type = "image/jpeg", description = "Raw image bytes"),
    responses(
        (status = 200, description = "Image attached", body = ApiResponse<ProductView>),
        (status = 400, description = "Empty or unsupported image"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream");
    let resp = product_service::attach_image(&state, &user, &id, content_type, &body).await?;
    Ok(Json(resp))
}
