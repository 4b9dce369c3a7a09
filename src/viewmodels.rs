//! Observable cells holding the latest known lists.
//!
//! Each action goes through the repository and then reloads the cell, so
//! subscribers see the post-action cache state.

use std::sync::Arc;

use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};

use crate::{
    error::AppResult,
    local::ProductFilter,
    models::{Category, Product},
    repositories::{CategoryRepository, ProductRepository},
};

pub struct ProductsViewModel {
    repo: ProductRepository,
    products: watch::Sender<Vec<Product>>,
}

impl ProductsViewModel {
    pub fn new(repo: ProductRepository) -> Self {
        let (products, _) = watch::channel(Vec::new());
        Self { repo, products }
    }

    pub fn repository(&self) -> &ProductRepository {
        &self.repo
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.products.subscribe()
    }

    pub fn current(&self) -> Vec<Product> {
        self.products.borrow().clone()
    }

    pub async fn refresh(&self) -> AppResult<Vec<Product>> {
        let items = self.repo.list_products(&ProductFilter::default()).await?;
        self.products.send_replace(items.clone());
        Ok(items)
    }

    pub async fn add(&self, product: Product) -> AppResult<Product> {
        let product = self.repo.add_product(product).await?;
        self.refresh().await?;
        Ok(product)
    }

    pub async fn update(&self, product: Product) -> AppResult<Product> {
        let result = self.repo.update_product(product).await;
        // The local half may have landed even if the remote half failed.
        self.refresh_after("update_product").await;
        result
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.repo.delete_product(id).await;
        self.refresh_after("delete_product").await;
        result
    }

    /// Refresh following an action whose own result must reach the caller.
    async fn refresh_after(&self, operation: &str) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(operation, error = %err, "product list refresh failed");
        }
    }

    pub async fn sync_from_cloud(&self) -> AppResult<usize> {
        let written = self.repo.sync_from_cloud().await?;
        self.refresh().await?;
        Ok(written)
    }

    /// Reload the cell whenever the local product table changes.
    pub fn spawn_auto_refresh(self: Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.repo.observe();
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        if let Err(err) = self.refresh().await {
                            tracing::warn!(error = %err, "product list refresh failed");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

pub struct CategoriesViewModel {
    repo: CategoryRepository,
    categories: watch::Sender<Vec<Category>>,
}

impl CategoriesViewModel {
    pub fn new(repo: CategoryRepository) -> Self {
        let (categories, _) = watch::channel(Vec::new());
        Self { repo, categories }
    }

    pub fn repository(&self) -> &CategoryRepository {
        &self.repo
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Category>> {
        self.categories.subscribe()
    }

    pub fn current(&self) -> Vec<Category> {
        self.categories.borrow().clone()
    }

    pub async fn refresh(&self) -> AppResult<Vec<Category>> {
        let items = self.repo.list_categories(false).await?;
        self.categories.send_replace(items.clone());
        Ok(items)
    }

    pub async fn add(&self, category: Category) -> AppResult<Category> {
        let category = self.repo.add_category(category).await?;
        self.refresh().await?;
        Ok(category)
    }

    pub async fn update(&self, category: Category) -> AppResult<Category> {
        let result = self.repo.update_category(category).await;
        self.refresh_after("update_category").await;
        result
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.repo.delete_category(id).await;
        self.refresh_after("delete_category").await;
        result
    }

    async fn refresh_after(&self, operation: &str) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(operation, error = %err, "category list refresh failed");
        }
    }

    pub async fn initialize_defaults(&self) -> AppResult<usize> {
        let seeded = self.repo.initialize_default_categories().await?;
        self.refresh().await?;
        Ok(seeded)
    }

    pub async fn sync_from_cloud(&self) -> AppResult<usize> {
        let written = self.repo.sync_from_cloud().await?;
        self.refresh().await?;
        Ok(written)
    }
}
