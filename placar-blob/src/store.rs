use async_trait::async_trait;

use crate::{BlobError, BlobResult, ByteStream};

/// Core object storage operations - implemented by every backend
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object from a stream
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult>;

    /// Object metadata without content. `BlobError::NotFound` when absent.
    async fn head(&self, key: &str) -> BlobResult<ObjectHead>;

    /// Delete an object
    async fn delete(&self, key: &str) -> BlobResult<()>;

    /// Short backend name for logs and diagnostics
    fn name(&self) -> &'static str;
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub etag: Option<String>,
    pub size_bytes: u64,
}

/// Metadata about an object
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<i64>,
}

/// Stand-in used when the bucket is not configured. Every call fails with
/// `NotConfigured`, which callers treat like an absent object.
#[derive(Debug, Clone)]
pub struct DisabledStore {
    missing: String,
}

impl DisabledStore {
    pub fn new(missing: &[&str]) -> Self {
        Self {
            missing: missing.join(", "),
        }
    }
}

#[async_trait]
impl BlobStore for DisabledStore {
    async fn put(&self, _key: &str, _content_type: Option<&str>, _stream: ByteStream) -> BlobResult<PutResult> {
        Err(BlobError::not_configured(&self.missing))
    }

    async fn head(&self, _key: &str) -> BlobResult<ObjectHead> {
        Err(BlobError::not_configured(&self.missing))
    }

    async fn delete(&self, _key: &str) -> BlobResult<()> {
        Err(BlobError::not_configured(&self.missing))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
