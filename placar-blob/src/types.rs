use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use placar_core::Category;

use crate::{BlobError, BlobResult};

/// Stream of bytes for object content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Wrap an in-memory buffer as a single-chunk stream.
pub fn once_stream(data: Bytes) -> ByteStream {
    Box::pin(futures::stream::once(async move { Ok(data) }))
}

/// Drain a stream into one buffer.
pub async fn collect_stream(stream: ByteStream) -> BlobResult<Bytes> {
    collect_stream_limited(stream, u64::MAX).await
}

/// Drain a stream, giving up as soon as it grows past `max` bytes.
pub async fn collect_stream_limited(mut stream: ByteStream, max: u64) -> BlobResult<Bytes> {
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let size = (data.len() + chunk.len()) as u64;
        if size > max {
            return Err(BlobError::TooLarge { size, max });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(data))
}

/// Request to store an image under its category prefix
#[derive(Debug, Clone)]
pub struct BlobPut {
    pub category: Category,
    pub filename: String,
    pub content_type: Option<String>,
}

impl BlobPut {
    pub fn new<S: Into<String>>(category: Category, filename: S) -> Self {
        Self {
            category,
            filename: filename.into(),
            content_type: None,
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Receipt returned after successfully storing an object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub key: String,
    /// Public URL the object is reachable at once the bucket policy allows it.
    pub url: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}
