use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{collect_stream, BlobError, BlobResult, BlobStore, ByteStream, ObjectHead, PutResult};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
}

/// In-memory object store for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    rejected: RwLock<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every put whose key contains `fragment` fail with a backend error.
    pub async fn reject_keys_containing<S: Into<String>>(&self, fragment: S) {
        self.rejected.write().await.push(fragment.into());
    }

    pub async fn insert<S: Into<String>>(&self, key: S, data: &'static [u8], content_type: Option<&str>) {
        self.objects.write().await.insert(
            key.into(),
            StoredObject {
                data: Bytes::from_static(data),
                content_type: content_type.map(str::to_string),
            },
        );
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn bytes(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|o| o.data.clone())
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, content_type: Option<&str>, stream: ByteStream) -> BlobResult<PutResult> {
        if self.rejected.read().await.iter().any(|f| key.contains(f.as_str())) {
            return Err(BlobError::backend(std::io::Error::other(format!("put rejected for {key}"))));
        }

        let data = collect_stream(stream).await?;
        let size_bytes = data.len() as u64;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.map(str::to_string),
            },
        );

        Ok(PutResult {
            etag: Some(format!("\"mem-{size_bytes}\"")),
            size_bytes,
        })
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let objects = self.objects.read().await;
        let object = objects.get(key).ok_or_else(|| BlobError::not_found(key))?;
        Ok(ObjectHead {
            size_bytes: object.data.len() as u64,
            content_type: object.content_type.clone(),
            etag: None,
            last_modified: None,
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::once_stream;

    #[tokio::test]
    async fn put_then_head() {
        let store = MemoryBlobStore::new();
        let result = store
            .put("itens/a.png", Some("image/png"), once_stream(Bytes::from_static(b"png")))
            .await
            .unwrap();
        assert_eq!(result.size_bytes, 3);

        let head = store.head("itens/a.png").await.unwrap();
        assert_eq!(head.content_type.as_deref(), Some("image/png"));
        assert!(store.head("itens/b.png").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn rejected_keys_fail() {
        let store = MemoryBlobStore::new();
        store.reject_keys_containing("broken").await;
        let err = store
            .put("itens/broken.png", None, once_stream(Bytes::from_static(b"x")))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::Backend { .. }));
        assert!(!store.contains("itens/broken.png").await);
    }
}
