use uuid::Uuid;

use crate::{
    blob::image_extension,
    dto::products::{ProductList, ProductRequest, ProductView, StockAdjustRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let matching = state
        .products
        .repository()
        .list_products(&query.filter())
        .await?;
    let total = matching.len() as i64;

    let items = matching
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(limit as usize)
        .map(ProductView::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<ProductView>> {
    let product = find_cached(state, id).await?;
    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn low_stock(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<ProductView> = state
        .products
        .repository()
        .low_stock_products()
        .await?
        .into_iter()
        .map(ProductView::from)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Low stock", ProductList { items }, Some(meta)))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductRequest,
) -> AppResult<ApiResponse<ProductView>> {
    ensure_category(state, &payload.category_id).await?;
    let product = payload.into_product(String::new(), state.default_low_stock_threshold);
    let product = state.products.add(product).await?;
    tracing::info!(user = %user.user_id, product_id = %product.id, "product created");

    Ok(ApiResponse::success(
        "Product created",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: ProductRequest,
) -> AppResult<ApiResponse<ProductView>> {
    find_cached(state, id).await?;
    ensure_category(state, &payload.category_id).await?;
    let product = payload.into_product(id.to_string(), state.default_low_stock_threshold);
    let product = state.products.update(product).await?;
    tracing::info!(user = %user.user_id, product_id = %product.id, "product updated");

    Ok(ApiResponse::success(
        "Updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

/// Sell or restock: shift quantity by `delta` and save the whole record.
pub async fn adjust_stock(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: StockAdjustRequest,
) -> AppResult<ApiResponse<ProductView>> {
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }
    let mut product = find_cached(state, id).await?;
    let quantity = product
        .quantity
        .checked_add(payload.delta)
        .filter(|q| *q >= 0)
        .ok_or_else(|| AppError::BadRequest("stock cannot be negative".into()))?;
    product.quantity = quantity;

    let product = state.products.update(product).await?;
    tracing::info!(user = %user.user_id, product_id = %product.id, delta = payload.delta, "stock adjusted");

    Ok(ApiResponse::success(
        "Inventory updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let repo = state.products.repository();
    let (cached, remote) = tokio::join!(repo.get_product_by_id(id), repo.get_remote_product(id));
    if cached?.is_none() && remote?.is_none() {
        return Err(AppError::NotFound);
    }

    state.products.delete(id).await?;
    tracing::info!(user = %user.user_id, product_id = %id, "product deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Store the picture in the blob store and point the product at its URL.
pub async fn attach_image(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    content_type: &str,
    bytes: &[u8],
) -> AppResult<ApiResponse<ProductView>> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("image is empty".into()));
    }
    let ext = image_extension(content_type)
        .ok_or_else(|| AppError::BadRequest(format!("unsupported image type {content_type}")))?;
    let mut product = find_cached(state, id).await?;

    let key = format!("products/{}/{}.{}", product.id, Uuid::new_v4().simple(), ext);
    let url = state.blobs.upload(&key, bytes, content_type).await?;
    product.image_path = Some(url);

    let product = state.products.update(product).await?;
    tracing::info!(user = %user.user_id, product_id = %product.id, "product image attached");

    Ok(ApiResponse::success(
        "Image attached",
        product.into(),
        Some(Meta::empty()),
    ))
}

async fn find_cached(state: &AppState, id: &str) -> AppResult<Product> {
    state
        .products
        .repository()
        .get_product_by_id(id)
        .await?
        .ok_or(AppError::NotFound)
}

async fn ensure_category(state: &AppState, category_id: &str) -> AppResult<()> {
    // Blank ids are left for field validation to report.
    if category_id.trim().is_empty() {
        return Ok(());
    }
    let exists = state
        .categories
        .repository()
        .get_category_by_id(category_id)
        .await?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("unknown category {category_id}")))
    }
}
