use crate::{
    dto::categories::{CategoryList, CategoryRequest, SeedResult},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::CategoryQuery,
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    query: CategoryQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    let mut items = state.categories.refresh().await?;
    if query.active_only {
        items.retain(|c| c.is_active);
    }
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let category = state
        .categories
        .add(payload.into_category(String::new()))
        .await?;
    tracing::info!(user = %user.user_id, category_id = %category.id, "category created");
    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    state
        .categories
        .repository()
        .get_category_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let category = state
        .categories
        .update(payload.into_category(id.to_string()))
        .await?;
    tracing::info!(user = %user.user_id, category_id = %category.id, "category updated");
    Ok(ApiResponse::success("Updated", category, Some(Meta::empty())))
}

/// Categories still referenced by cached products stay put.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .categories
        .repository()
        .get_category_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let in_use = state.local.count_products_in_category(id).await?;
    if in_use > 0 {
        return Err(AppError::BadRequest(format!(
            "category is used by {in_use} product(s)"
        )));
    }
    state.categories.delete(id).await?;
    tracing::info!(user = %user.user_id, category_id = %id, "category deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn initialize_defaults(state: &AppState) -> AppResult<ApiResponse<SeedResult>> {
    let seeded = state.categories.initialize_defaults().await?;
    Ok(ApiResponse::success(
        "Default categories",
        SeedResult { seeded },
        Some(Meta::empty()),
    ))
}
