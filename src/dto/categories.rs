use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Category;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
    pub is_active: Option<bool>,
}

impl CategoryRequest {
    pub fn into_category(self, id: String) -> Category {
        Category {
            id,
            name: self.name.trim().to_string(),
            display_order: self.display_order,
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedResult {
    pub seeded: usize,
}
