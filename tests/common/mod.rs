#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use smartshop::{
    blob::FsBlobStore,
    db::connect_stores,
    error::{AppError, AppResult},
    local::LocalStore,
    models::{Category, Product},
    remote::{Document, DocumentStore, RemoteChange, RemoteStore},
    state::AppState,
};
use tempfile::TempDir;
use tokio::sync::broadcast;

pub const JWT_SECRET: &str = "test-secret";

/// Remote store that can be told to fail, wrapping a real document store.
pub struct FlakyRemote {
    inner: DocumentStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyRemote {
    pub fn new(inner: DocumentStore) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn write_gate(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Remote("network unreachable".into()));
        }
        Ok(())
    }

    fn read_gate(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Remote("network unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FlakyRemote {
    async fn add(&self, collection: &str, body: Value) -> AppResult<String> {
        self.write_gate()?;
        self.inner.add(collection, body).await
    }

    async fn set(&self, collection: &str, id: &str, body: Value) -> AppResult<()> {
        self.write_gate()?;
        self.inner.set(collection, id, body).await
    }

    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        self.read_gate()?;
        self.inner.get(collection, id).await
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        self.write_gate()?;
        self.inner.delete(collection, id).await
    }

    async fn fetch_all(&self, collection: &str) -> AppResult<Vec<Document>> {
        self.read_gate()?;
        self.inner.fetch_all(collection).await
    }

    fn subscribe(&self) -> broadcast::Receiver<RemoteChange> {
        self.inner.subscribe()
    }
}

pub struct TestContext {
    pub state: AppState,
    pub remote: Arc<FlakyRemote>,
    pub blob_dir: TempDir,
}

/// Fresh in-memory local cache and remote store, plus a temp blob directory.
pub async fn setup() -> anyhow::Result<TestContext> {
    let (local, remote) = connect_stores("sqlite::memory:", "sqlite::memory:").await?;
    let remote = Arc::new(FlakyRemote::new(DocumentStore::new(remote)));
    let blob_dir = tempfile::tempdir()?;
    let blobs = FsBlobStore::new(blob_dir.path(), "http://localhost:3000");

    let state = AppState::new(
        LocalStore::new(local),
        remote.clone(),
        Arc::new(blobs),
        JWT_SECRET,
        5,
    );
    Ok(TestContext {
        state,
        remote,
        blob_dir,
    })
}

pub fn ring(name: &str, quantity: i32, threshold: i32) -> Product {
    Product {
        id: String::new(),
        name: name.to_string(),
        description: Some("18k gold".to_string()),
        category_id: "cat-rings".to_string(),
        quantity,
        price: Decimal::new(12_000, 2),
        image_path: None,
        is_available: true,
        low_stock_threshold: threshold,
    }
}

pub fn category(name: &str, display_order: i32) -> Category {
    Category {
        id: String::new(),
        name: name.to_string(),
        display_order,
        is_active: true,
    }
}
