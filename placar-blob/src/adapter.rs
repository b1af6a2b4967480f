use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use crate::{
    once_stream, BlobError, BlobPut, BlobResult, BlobStore, ObjectHead, StorageLayout, UploadReceipt,
};

/// Limits applied by the adapter before touching the store
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Absolute max size allowed for a single image
    pub max_blob_bytes: u64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: 20 * 1024 * 1024, // 20MB
        }
    }
}

impl BlobConfig {
    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }
}

/// The object-store handle injected into resolvers, proxies and migrations.
///
/// Combines a [`BlobStore`] with the bucket [`StorageLayout`] so callers speak in
/// categories and filenames instead of raw keys.
#[derive(Clone)]
pub struct BlobAdapter {
    store: Arc<dyn BlobStore>,
    layout: StorageLayout,
    config: BlobConfig,
}

impl BlobAdapter {
    pub fn new<S: BlobStore + 'static>(store: S, layout: StorageLayout) -> Self {
        Self::from_arc(Arc::new(store), layout)
    }

    pub fn from_arc(store: Arc<dyn BlobStore>, layout: StorageLayout) -> Self {
        Self {
            store,
            layout,
            config: BlobConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BlobConfig) -> Self {
        self.config = config;
        self
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Largest body [`BlobAdapter::upload`] accepts.
    pub fn max_blob_bytes(&self) -> u64 {
        self.config.max_blob_bytes
    }

    pub fn public_url(&self, key: &str) -> String {
        self.layout.public_url(key)
    }

    /// Store an image under `{category prefix}{filename}`.
    pub async fn upload(&self, put: BlobPut, body: Bytes) -> BlobResult<UploadReceipt> {
        let size = body.len() as u64;
        if size > self.config.max_blob_bytes {
            return Err(BlobError::TooLarge {
                size,
                max: self.config.max_blob_bytes,
            });
        }
        if put.filename.trim().is_empty() || put.filename.contains('/') {
            return Err(BlobError::invalid(format!("Invalid object filename: {:?}", put.filename)));
        }

        let key = self.layout.object_key(put.category, &put.filename);
        let result = self
            .store
            .put(&key, put.content_type.as_deref(), once_stream(body))
            .await?;

        info!(key = %key, size_bytes = result.size_bytes, store = self.store.name(), "object uploaded");

        Ok(UploadReceipt {
            url: self.layout.public_url(&key),
            key,
            size_bytes: result.size_bytes,
            content_type: put.content_type,
            etag: result.etag,
        })
    }

    pub async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        self.store.head(key).await
    }

    /// Metadata-only existence check. Only "not found" means absent; other
    /// failures are returned so the caller can decide.
    pub async fn exists(&self, key: &str) -> BlobResult<bool> {
        match self.store.head(key).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Delete an object that must exist.
    pub async fn delete(&self, key: &str) -> BlobResult<()> {
        if key.trim().is_empty() {
            return Err(BlobError::invalid("Object key is empty"));
        }
        self.store.head(key).await?;
        self.store.delete(key).await?;
        warn!(key, store = self.store.name(), "object deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBlobStore;
    use placar_core::Category;

    fn adapter() -> (Arc<MemoryBlobStore>, BlobAdapter) {
        let store = Arc::new(MemoryBlobStore::new());
        let adapter = BlobAdapter::from_arc(store.clone(), StorageLayout::new("placar"));
        (store, adapter)
    }

    #[tokio::test]
    async fn upload_uses_category_prefix() {
        let (store, adapter) = adapter();
        let receipt = adapter
            .upload(
                BlobPut::new(Category::Item, "chest.png").with_content_type("image/png"),
                Bytes::from_static(b"png"),
            )
            .await
            .unwrap();

        assert_eq!(receipt.key, "itens/chest.png");
        assert_eq!(receipt.url, "https://placar.s3.amazonaws.com/itens/chest.png");
        assert!(store.contains("itens/chest.png").await);
        assert!(adapter.exists("itens/chest.png").await.unwrap());
        assert!(!adapter.exists("banners_dupla/chest.png").await.unwrap());
    }

    #[tokio::test]
    async fn upload_rejects_oversized_bodies() {
        let (_, adapter) = adapter();
        let adapter = adapter.with_config(BlobConfig::default().with_max_blob_bytes(2));
        let err = adapter
            .upload(BlobPut::new(Category::Banner, "a.png"), Bytes::from_static(b"abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::TooLarge { size: 3, max: 2 }));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (store, adapter) = adapter();
        store.insert("itens/a.png", b"a", None).await;

        adapter.delete("itens/a.png").await.unwrap();
        assert!(!store.contains("itens/a.png").await);
        assert!(adapter.delete("itens/a.png").await.unwrap_err().is_not_found());
    }
}
