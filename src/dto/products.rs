use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, StockStatus};

/// Full product form. Edits send the whole record; nothing is patched.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "149.99")]
    pub price: Decimal,
    pub image_path: Option<String>,
    pub is_available: Option<bool>,
    pub low_stock_threshold: Option<i32>,
}

impl ProductRequest {
    pub fn into_product(self, id: String, default_threshold: i32) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            category_id: self.category_id,
            quantity: self.quantity,
            price: self.price,
            image_path: self.image_path,
            is_available: self.is_available.unwrap_or(true),
            low_stock_threshold: self.low_stock_threshold.unwrap_or(default_threshold),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockAdjustRequest {
    pub delta: i32,
}

/// A product together with its derived stock status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let stock_status = product.stock_status();
        Self {
            product,
            stock_status,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductView>,
}
