use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{AppError, AppResult};

/// Accepts image bytes and hands back a publicly resolvable URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> AppResult<String>;
}

/// Blob store on the local filesystem, served by the API under `/media`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(AppError::BadRequest(format!("invalid blob key {key}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> AppResult<String> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        tracing::info!(key, content_type, size = bytes.len(), "blob uploaded");
        Ok(format!("{}/media/{}", self.public_base_url, key))
    }
}

/// File extension for the image types the upload endpoints accept.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_keys_escaping_root() {
        let store = FsBlobStore::new("/tmp/blobs", "http://localhost:3000/");
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("/abs/path.png").is_err());
        assert!(store.resolve("").is_err());
        assert!(store.resolve("products/p1/a.png").is_ok());
    }

    #[test]
    fn known_image_types_only() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("application/pdf"), None);
    }
}
