use std::sync::Arc;

use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};

use crate::{
    error::{AppError, AppResult},
    local::LocalStore,
    models::Category,
    remote::{self, CATEGORIES, RemoteStore},
    validation::validate_category,
};

use super::settle;

/// Seeded into an empty cache: (id, name, display order).
pub const DEFAULT_CATEGORIES: [(&str, &str, i32); 5] = [
    ("cat-rings", "Rings", 1),
    ("cat-necklaces", "Necklaces", 2),
    ("cat-earrings", "Earrings", 3),
    ("cat-bracelets", "Bracelets", 4),
    ("cat-watches", "Watches", 5),
];

#[derive(Clone)]
pub struct CategoryRepository {
    local: LocalStore,
    remote: Arc<dyn RemoteStore>,
}

impl CategoryRepository {
    pub fn new(local: LocalStore, remote: Arc<dyn RemoteStore>) -> Self {
        Self { local, remote }
    }

    pub async fn add_category(&self, category: Category) -> AppResult<Category> {
        validate_category(&category)?;
        let body = remote::encode(&category)?;
        let id = self.remote.add(CATEGORIES, body).await?;
        let category = Category { id, ..category };

        if let Err(err) = self.local.upsert_category(&category).await {
            tracing::warn!(id = %category.id, error = %err, "category stored remotely but not cached; stores diverge");
            return Err(err);
        }
        tracing::info!(id = %category.id, name = %category.name, "category added");
        Ok(category)
    }

    pub async fn update_category(&self, category: Category) -> AppResult<Category> {
        if category.id.is_empty() {
            return Err(AppError::BadRequest(
                "category must be added before it can be updated".into(),
            ));
        }
        validate_category(&category)?;
        let body = remote::encode(&category)?;
        let (local, remote) = tokio::join!(
            self.local.upsert_category(&category),
            self.remote.set(CATEGORIES, &category.id, body),
        );
        settle("update_category", &category.id, local, remote)?;
        Ok(category)
    }

    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        let (local, remote) = tokio::join!(
            self.local.delete_category(id),
            self.remote.delete(CATEGORIES, id),
        );
        settle("delete_category", id, local, remote)?;
        tracing::info!(id, "category deleted");
        Ok(())
    }

    pub async fn get_category_by_id(&self, id: &str) -> AppResult<Option<Category>> {
        self.local.get_category(id).await
    }

    pub async fn list_categories(&self, active_only: bool) -> AppResult<Vec<Category>> {
        self.local.list_categories(active_only).await
    }

    /// Seed the fixed category list, but only into an empty cache.
    ///
    /// Seed ids are fixed, so a repeated or racing seed overwrites the same
    /// five rows instead of adding more.
    pub async fn initialize_default_categories(&self) -> AppResult<usize> {
        if self.local.count_categories().await? > 0 {
            return Ok(0);
        }

        for (id, name, display_order) in DEFAULT_CATEGORIES {
            let category = Category {
                id: id.to_string(),
                name: name.to_string(),
                display_order,
                is_active: true,
            };
            let body = remote::encode(&category)?;
            let (local, remote) = tokio::join!(
                self.local.upsert_category(&category),
                self.remote.set(CATEGORIES, id, body),
            );
            settle("seed_category", id, local, remote)?;
        }
        tracing::info!(count = DEFAULT_CATEGORIES.len(), "default categories seeded");
        Ok(DEFAULT_CATEGORIES.len())
    }

    /// Overwrite cached categories with every remote category.
    pub async fn sync_from_cloud(&self) -> AppResult<usize> {
        let docs = self.remote.fetch_all(CATEGORIES).await?;
        let mut written = 0;
        for doc in docs {
            let id = doc.id.clone();
            let category: Category = match doc.decode() {
                Ok(category) => category,
                Err(err) => {
                    tracing::warn!(id = %id, error = %err, "skipping undecodable remote category");
                    continue;
                }
            };
            self.local.upsert_category(&category).await?;
            written += 1;
        }
        tracing::debug!(written, "categories synced from cloud");
        Ok(written)
    }

    /// Keep the cache following the remote collection.
    ///
    /// Every remote category change triggers a full overwrite of the cached
    /// rows; the remote side always wins. Abort the handle to stop.
    pub fn watch_remote(&self) -> JoinHandle<()> {
        let mut changes = self.remote.subscribe();
        let repo = self.clone();
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) if change.collection == CATEGORIES => {
                        if let Err(err) = repo.sync_from_cloud().await {
                            tracing::warn!(error = %err, "category snapshot sync failed");
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "category listener lagged; resyncing");
                        if let Err(err) = repo.sync_from_cloud().await {
                            tracing::warn!(error = %err, "category snapshot sync failed");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
