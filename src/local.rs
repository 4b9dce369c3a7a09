//! Local cache: the on-device tables for products, categories and profiles.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, sea_query::OnConflict,
};
use tokio::sync::broadcast;

use crate::{
    entity::{
        categories::{self, Entity as Categories},
        products::{self, Entity as Products},
        user_profiles::{self, Entity as UserProfiles},
    },
    error::{AppError, AppResult},
    models::{Category, Product, StockStatus, UserProfile},
    remote::ChangeKind,
};

/// Emitted after every local product write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChange {
    pub id: String,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<String>,
    pub search: Option<String>,
    pub available: Option<bool>,
    pub status: Option<StockStatus>,
}

#[derive(Clone)]
pub struct LocalStore {
    db: DatabaseConnection,
    product_changes: broadcast::Sender<ProductChange>,
}

impl LocalStore {
    pub fn new(db: DatabaseConnection) -> Self {
        let (product_changes, _) = broadcast::channel(256);
        Self {
            db,
            product_changes,
        }
    }

    pub fn subscribe_products(&self) -> broadcast::Receiver<ProductChange> {
        self.product_changes.subscribe()
    }

    fn notify_product(&self, id: &str, kind: ChangeKind) {
        let _ = self.product_changes.send(ProductChange {
            id: id.to_string(),
            kind,
        });
    }

    pub async fn get_product(&self, id: &str) -> AppResult<Option<Product>> {
        let model = Products::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(product_from_entity))
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let mut condition = Condition::all();
        if let Some(category_id) = filter.category_id.as_ref().filter(|c| !c.is_empty()) {
            condition = condition.add(products::Column::CategoryId.eq(category_id.clone()));
        }
        if let Some(search) = filter.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(products::Column::Name.contains(search))
                    .add(products::Column::Description.contains(search)),
            );
        }
        if let Some(available) = filter.available {
            condition = condition.add(products::Column::IsAvailable.eq(available));
        }

        let items = Products::find()
            .filter(condition)
            .order_by_asc(products::Column::Name)
            .order_by_asc(products::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(product_from_entity)
            .filter(|p| filter.status.is_none_or(|status| p.stock_status() == status))
            .collect();
        Ok(items)
    }

    /// Insert or overwrite the row keyed by `product.id`.
    pub async fn upsert_product(&self, product: &Product) -> AppResult<()> {
        if !product.has_id() {
            return Err(AppError::BadRequest(
                "product has no id yet; it must be written remotely first".into(),
            ));
        }
        let row = product_to_active(product)?;
        Products::insert(row)
            .on_conflict(
                OnConflict::column(products::Column::Id)
                    .update_columns([
                        products::Column::Name,
                        products::Column::Description,
                        products::Column::CategoryId,
                        products::Column::Quantity,
                        products::Column::PriceCents,
                        products::Column::ImagePath,
                        products::Column::IsAvailable,
                        products::Column::LowStockThreshold,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        self.notify_product(&product.id, ChangeKind::Upserted);
        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn delete_product(&self, id: &str) -> AppResult<bool> {
        let result = Products::delete_by_id(id.to_string()).exec(&self.db).await?;
        let removed = result.rows_affected > 0;
        if removed {
            self.notify_product(id, ChangeKind::Deleted);
        }
        Ok(removed)
    }

    pub async fn count_products_in_category(&self, category_id: &str) -> AppResult<u64> {
        let count = Products::find()
            .filter(products::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn get_category(&self, id: &str) -> AppResult<Option<Category>> {
        let model = Categories::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(category_from_entity))
    }

    /// Categories in display order; ties fall back to name.
    pub async fn list_categories(&self, active_only: bool) -> AppResult<Vec<Category>> {
        let mut finder = Categories::find();
        if active_only {
            finder = finder.filter(categories::Column::IsActive.eq(true));
        }
        let items = finder
            .order_by_asc(categories::Column::DisplayOrder)
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(category_from_entity)
            .collect();
        Ok(items)
    }

    pub async fn count_categories(&self) -> AppResult<u64> {
        Ok(Categories::find().count(&self.db).await?)
    }

    pub async fn upsert_category(&self, category: &Category) -> AppResult<()> {
        let row = categories::ActiveModel {
            id: Set(category.id.clone()),
            name: Set(category.name.clone()),
            display_order: Set(category.display_order),
            is_active: Set(category.is_active),
        };
        Categories::insert(row)
            .on_conflict(
                OnConflict::column(categories::Column::Id)
                    .update_columns([
                        categories::Column::Name,
                        categories::Column::DisplayOrder,
                        categories::Column::IsActive,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    pub async fn delete_category(&self, id: &str) -> AppResult<bool> {
        let result = Categories::delete_by_id(id.to_string()).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_profile(&self, id: &str) -> AppResult<Option<UserProfile>> {
        let model = UserProfiles::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(profile_from_entity))
    }

    pub async fn upsert_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let row = user_profiles::ActiveModel {
            id: Set(profile.id.clone()),
            full_name: Set(profile.full_name.clone()),
            email: Set(profile.email.clone()),
            phone: Set(profile.phone.clone()),
            image_path: Set(profile.image_path.clone()),
        };
        UserProfiles::insert(row)
            .on_conflict(
                OnConflict::column(user_profiles::Column::Id)
                    .update_columns([
                        user_profiles::Column::FullName,
                        user_profiles::Column::Email,
                        user_profiles::Column::Phone,
                        user_profiles::Column::ImagePath,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}

pub fn price_to_cents(price: Decimal) -> AppResult<i64> {
    price
        .round_dp(2)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| AppError::BadRequest(format!("price {price} is out of range")))
}

pub fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn product_to_active(product: &Product) -> AppResult<products::ActiveModel> {
    Ok(products::ActiveModel {
        id: Set(product.id.clone()),
        name: Set(product.name.clone()),
        description: Set(product.description.clone()),
        category_id: Set(product.category_id.clone()),
        quantity: Set(product.quantity),
        price_cents: Set(price_to_cents(product.price)?),
        image_path: Set(product.image_path.clone()),
        is_available: Set(product.is_available),
        low_stock_threshold: Set(product.low_stock_threshold),
    })
}

fn product_from_entity(model: products::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        category_id: model.category_id,
        quantity: model.quantity,
        price: cents_to_price(model.price_cents),
        image_path: model.image_path,
        is_available: model.is_available,
        low_stock_threshold: model.low_stock_threshold,
    }
}

fn category_from_entity(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        display_order: model.display_order,
        is_active: model.is_active,
    }
}

fn profile_from_entity(model: user_profiles::Model) -> UserProfile {
    UserProfile {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        phone: model.phone,
        image_path: model.image_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn price_round_trips_through_cents() {
        let price = Decimal::from_str("149.99").unwrap();
        assert_eq!(price_to_cents(price).unwrap(), 14999);
        assert_eq!(cents_to_price(14999), price);
        assert_eq!(cents_to_price(1250), Decimal::from_str("12.5").unwrap());
        assert!(price_to_cents(Decimal::MAX).is_err());
        assert!(price_to_cents(Decimal::from(i64::MAX)).is_err());
    }
}
