use crate::{
    dto::sync::SyncReport,
    error::AppResult,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Pull both remote collections into the cache. Categories go first so
/// freshly synced products can resolve their category.
pub async fn sync_all(state: &AppState) -> AppResult<ApiResponse<SyncReport>> {
    let categories = state.categories.sync_from_cloud().await?;
    let products = state.products.sync_from_cloud().await?;
    tracing::info!(categories, products, "cloud sync finished");
    Ok(ApiResponse::success(
        "Synced",
        SyncReport {
            categories,
            products,
        },
        Some(Meta::empty()),
    ))
}
