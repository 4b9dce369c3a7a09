use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{
    dto::stats::{CategoryCount, Dashboard},
    error::{AppError, AppResult},
    models::{Category, Product, StockStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn dashboard(state: &AppState) -> AppResult<ApiResponse<Dashboard>> {
    let products = state.products.refresh().await?;
    let categories = state.categories.refresh().await?;
    Ok(ApiResponse::success(
        "Dashboard",
        summarize(&products, &categories)?,
        Some(Meta::empty()),
    ))
}

/// Totals over the given lists. Fails only if the inventory value does not
/// fit in a `Decimal`.
pub fn summarize(products: &[Product], categories: &[Category]) -> AppResult<Dashboard> {
    let mut in_stock = 0;
    let mut low_stock = 0;
    let mut out_of_stock = 0;
    let mut total_units: i64 = 0;
    let mut inventory_value = Decimal::ZERO;
    let mut per_category: BTreeMap<&str, usize> = BTreeMap::new();

    for product in products {
        match product.stock_status() {
            StockStatus::InStock => in_stock += 1,
            StockStatus::LowStock => low_stock += 1,
            StockStatus::OutOfStock => out_of_stock += 1,
        }
        let quantity = product.quantity.max(0);
        total_units += i64::from(quantity);
        inventory_value = product
            .price
            .checked_mul(Decimal::from(quantity))
            .and_then(|value| inventory_value.checked_add(value))
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "inventory value overflows at product {}",
                    product.id
                ))
            })?;
        *per_category.entry(product.category_id.as_str()).or_default() += 1;
    }

    let per_category = per_category
        .into_iter()
        .map(|(category_id, product_count)| CategoryCount {
            category_id: category_id.to_string(),
            category_name: categories
                .iter()
                .find(|c| c.id == category_id)
                .map(|c| c.name.clone()),
            product_count,
        })
        .collect();

    Ok(Dashboard {
        total_products: products.len(),
        total_units,
        inventory_value,
        in_stock,
        low_stock,
        out_of_stock,
        available_products: products.iter().filter(|p| p.is_available).count(),
        active_categories: categories.iter().filter(|c| c.is_active).count(),
        per_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, category: &str, quantity: i32, cents: i64) -> Product {
        Product {
            id: id.into(),
            name: id.into(),
            description: None,
            category_id: category.into(),
            quantity,
            price: Decimal::new(cents, 2),
            image_path: None,
            is_available: quantity > 0,
            low_stock_threshold: 5,
        }
    }

    #[test]
    fn summarizes_stock_and_value() {
        let products = vec![
            product("a", "cat-rings", 3, 10000),
            product("b", "cat-rings", 0, 5000),
            product("c", "cat-watches", 10, 2550),
        ];
        let categories = vec![Category {
            id: "cat-rings".into(),
            name: "Rings".into(),
            display_order: 1,
            is_active: true,
        }];

        let dash = summarize(&products, &categories).unwrap();
        assert_eq!(dash.total_products, 3);
        assert_eq!(dash.total_units, 13);
        assert_eq!(dash.inventory_value, Decimal::new(55500, 2));
        assert_eq!((dash.in_stock, dash.low_stock, dash.out_of_stock), (1, 1, 1));
        assert_eq!(dash.available_products, 2);
        assert_eq!(dash.active_categories, 1);
        assert_eq!(dash.per_category.len(), 2);
        assert_eq!(dash.per_category[0].category_id, "cat-rings");
        assert_eq!(dash.per_category[0].category_name.as_deref(), Some("Rings"));
        assert_eq!(dash.per_category[0].product_count, 2);
        assert_eq!(dash.per_category[1].category_name, None);
    }

    #[test]
    fn empty_inventory() {
        let dash = summarize(&[], &[]).unwrap();
        assert_eq!(dash.total_products, 0);
        assert_eq!(dash.inventory_value, Decimal::ZERO);
        assert!(dash.per_category.is_empty());
    }

    #[test]
    fn value_overflow_is_an_error() {
        let mut huge = product("a", "cat-rings", 10, 0);
        huge.price = Decimal::MAX;
        assert!(matches!(
            summarize(&[huge], &[]),
            Err(AppError::Internal(_))
        ));
    }
}
