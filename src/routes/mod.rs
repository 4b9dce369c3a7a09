use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod profile;
pub mod stats;
pub mod sync;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/sync", sync::router())
        .nest("/stats", stats::router())
}
