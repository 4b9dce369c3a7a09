//! Remote document store: the authoritative copy of every record.
//!
//! Records are JSON documents grouped by collection and addressed by a string
//! id. Writes are whole-document replaces; there is no versioning and the last
//! write wins.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::OnConflict,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    entity::documents::{ActiveModel, Column, Entity as Documents},
    error::{AppError, AppResult},
};

pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";
pub const USERS: &str = "users";
pub const ACCOUNTS: &str = "accounts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Upserted,
    Deleted,
}

/// Pushed to subscribers after every successful remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteChange {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

impl Document {
    /// Decode the body into a record, injecting the document id as its `id` field.
    pub fn decode<T: DeserializeOwned>(self) -> AppResult<T> {
        let mut body = self.body;
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), Value::String(self.id));
        }
        Ok(serde_json::from_value(body)?)
    }
}

/// Serialize a record into a document body. The `id` field is addressing, not content.
pub fn encode<T: Serialize>(record: &T) -> AppResult<Value> {
    let mut body = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Store a new document under a generated id and return that id.
    async fn add(&self, collection: &str, body: Value) -> AppResult<String>;

    /// Create or fully replace the document at `id`.
    async fn set(&self, collection: &str, id: &str, body: Value) -> AppResult<()>;

    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;

    /// Remove the document. Removing an absent document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> AppResult<()>;

    async fn fetch_all(&self, collection: &str) -> AppResult<Vec<Document>>;

    /// Documents whose top-level `field` equals `value`.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> AppResult<Vec<Document>> {
        let docs = self.fetch_all(collection).await?;
        Ok(docs
            .into_iter()
            .filter(|doc| doc.body.get(field) == Some(value))
            .collect())
    }

    /// Change feed for every collection; receivers filter by collection.
    fn subscribe(&self) -> broadcast::Receiver<RemoteChange>;
}

/// Document store backed by a SeaORM connection (Postgres in deployment).
///
/// Only writes made through this handle (or its clones) reach subscribers.
#[derive(Clone)]
pub struct DocumentStore {
    db: DatabaseConnection,
    changes: broadcast::Sender<RemoteChange>,
}

impl DocumentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(256);
        Self { db, changes }
    }

    fn notify(&self, collection: &str, id: &str, kind: ChangeKind) {
        // No receivers is fine.
        let _ = self.changes.send(RemoteChange {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
        });
    }

    async fn upsert(&self, collection: &str, id: &str, body: &Value) -> AppResult<()> {
        let row = ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id.to_string()),
            body: Set(serde_json::to_string(body)?),
            updated_at: Set(Utc::now().timestamp_millis()),
        };
        Documents::insert(row)
            .on_conflict(
                OnConflict::columns([Column::Collection, Column::Id])
                    .update_columns([Column::Body, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(AppError::remote)?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for DocumentStore {
    async fn add(&self, collection: &str, body: Value) -> AppResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.upsert(collection, &id, &body).await?;
        tracing::debug!(collection, id = %id, "remote document added");
        self.notify(collection, &id, ChangeKind::Upserted);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, body: Value) -> AppResult<()> {
        self.upsert(collection, id, &body).await?;
        tracing::debug!(collection, id, "remote document replaced");
        self.notify(collection, id, ChangeKind::Upserted);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let row = Documents::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await
            .map_err(AppError::remote)?;
        row.map(|row| -> AppResult<Document> {
            Ok(Document {
                id: row.id,
                body: serde_json::from_str(&row.body)?,
            })
        })
        .transpose()
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        let result = Documents::delete_by_id((collection.to_string(), id.to_string()))
            .exec(&self.db)
            .await
            .map_err(AppError::remote)?;
        if result.rows_affected > 0 {
            tracing::debug!(collection, id, "remote document deleted");
            self.notify(collection, id, ChangeKind::Deleted);
        }
        Ok(())
    }

    async fn fetch_all(&self, collection: &str) -> AppResult<Vec<Document>> {
        let rows = Documents::find()
            .filter(Column::Collection.eq(collection))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::remote)?;
        rows.into_iter()
            .map(|row| -> AppResult<Document> {
                Ok(Document {
                    id: row.id,
                    body: serde_json::from_str(&row.body)?,
                })
            })
            .collect()
    }

    fn subscribe(&self) -> broadcast::Receiver<RemoteChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn encode_drops_id_and_decode_restores_it() {
        let category = Category {
            id: "cat-rings".into(),
            name: "Rings".into(),
            display_order: 1,
            is_active: true,
        };
        let body = encode(&category).unwrap();
        assert!(body.get("id").is_none());

        let doc = Document {
            id: "cat-rings".into(),
            body,
        };
        let decoded: Category = doc.decode().unwrap();
        assert_eq!(decoded, category);
    }
}
