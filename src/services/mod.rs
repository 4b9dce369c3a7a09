pub mod auth_service;
pub mod category_service;
pub mod product_service;
pub mod profile_service;
pub mod stats_service;
pub mod sync_service;
