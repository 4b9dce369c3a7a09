use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{
    error::{AppError, AppResult},
    local::{LocalStore, ProductChange, ProductFilter, price_to_cents},
    models::{Product, StockStatus},
    remote::{self, PRODUCTS, RemoteStore},
    validation::validate_product,
};

use super::settle;

#[derive(Clone)]
pub struct ProductRepository {
    local: LocalStore,
    remote: Arc<dyn RemoteStore>,
}

impl ProductRepository {
    pub fn new(local: LocalStore, remote: Arc<dyn RemoteStore>) -> Self {
        Self { local, remote }
    }

    /// Remote first: the remote store assigns the id, then the record is cached
    /// locally under it. A remote failure leaves the cache untouched.
    pub async fn add_product(&self, mut product: Product) -> AppResult<Product> {
        product.price = product.price.round_dp(2);
        validate_product(&product, true)?;

        let body = remote::encode(&product)?;
        let id = self.remote.add(PRODUCTS, body).await?;
        let product = Product { id, ..product };

        if let Err(err) = self.local.upsert_product(&product).await {
            tracing::warn!(id = %product.id, error = %err, "product stored remotely but not cached; stores diverge");
            return Err(err);
        }
        tracing::info!(id = %product.id, name = %product.name, "product added");
        Ok(product)
    }

    /// Full-record overwrite of both copies, issued concurrently.
    pub async fn update_product(&self, mut product: Product) -> AppResult<Product> {
        if !product.has_id() {
            return Err(AppError::BadRequest(
                "product must be added before it can be updated".into(),
            ));
        }
        product.price = product.price.round_dp(2);
        validate_product(&product, false)?;

        let body = remote::encode(&product)?;
        let (local, remote) = tokio::join!(
            self.local.upsert_product(&product),
            self.remote.set(PRODUCTS, &product.id, body),
        );
        settle("update_product", &product.id, local, remote)?;
        tracing::info!(id = %product.id, "product updated");
        Ok(product)
    }

    /// Best-effort removal of both copies. Absent records are a no-op.
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        let (local, remote) = tokio::join!(
            self.local.delete_product(id),
            self.remote.delete(PRODUCTS, id),
        );
        settle("delete_product", id, local, remote)?;
        tracing::info!(id, "product deleted");
        Ok(())
    }

    pub async fn get_product_by_id(&self, id: &str) -> AppResult<Option<Product>> {
        self.local.get_product(id).await
    }

    pub async fn get_remote_product(&self, id: &str) -> AppResult<Option<Product>> {
        self.remote
            .get(PRODUCTS, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        self.local.list_products(filter).await
    }

    /// Everything not comfortably in stock, emptiest first.
    pub async fn low_stock_products(&self) -> AppResult<Vec<Product>> {
        let mut items: Vec<Product> = self
            .local
            .list_products(&ProductFilter::default())
            .await?
            .into_iter()
            .filter(|p| p.stock_status() != StockStatus::InStock)
            .collect();
        items.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    /// Pull every remote product into the cache, overwriting by id.
    ///
    /// Remote deletions are not carried over: rows that no longer exist
    /// remotely stay in the cache.
    pub async fn sync_from_cloud(&self) -> AppResult<usize> {
        let docs = self.remote.fetch_all(PRODUCTS).await?;
        let mut written = 0;
        for doc in docs {
            let id = doc.id.clone();
            let product: Product = match doc.decode() {
                Ok(product) => product,
                Err(err) => {
                    tracing::warn!(id = %id, error = %err, "skipping undecodable remote product");
                    continue;
                }
            };
            if let Err(err) = price_to_cents(product.price) {
                tracing::warn!(id = %id, error = %err, "skipping remote product with unstorable price");
                continue;
            }
            self.local.upsert_product(&product).await?;
            written += 1;
        }
        tracing::info!(written, "products synced from cloud");
        Ok(written)
    }

    pub fn observe(&self) -> broadcast::Receiver<ProductChange> {
        self.local.subscribe_products()
    }
}
