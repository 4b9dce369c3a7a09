use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category_id: String,
    pub category_name: Option<String>,
    pub product_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub total_products: usize,
    pub total_units: i64,
    #[schema(value_type = String, example = "15249.50")]
    pub inventory_value: Decimal,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub available_products: usize,
    pub active_categories: usize,
    pub per_category: Vec<CategoryCount>,
}
