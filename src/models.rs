use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stock level derived from quantity and the low-stock threshold. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// `OutOfStock` when nothing is left, `LowStock` up to and including the
    /// threshold, `InStock` above it. Negative quantities count as empty.
    pub fn derive(quantity: i32, threshold: i32) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity <= threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

/// A product record as stored in both the local cache and the remote store.
///
/// `id` stays empty until the remote store has accepted the first write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "149.99")]
    pub price: Decimal,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub low_stock_threshold: i32,
}

fn default_available() -> bool {
    true
}

impl Product {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::derive(self.quantity, self.low_stock_threshold)
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub display_order: i32,
    #[serde(default = "default_available")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Credential record owned by the auth provider; lives only in the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub password_hash: String,
}
