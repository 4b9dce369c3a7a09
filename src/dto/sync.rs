use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SyncReport {
    pub categories: usize,
    pub products: usize,
}
