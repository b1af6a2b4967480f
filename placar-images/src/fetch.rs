use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use placar_blob::{collect_stream_limited, BlobError, ByteStream};
use reqwest::{header, Client};
use thiserror::Error;
use tracing::debug;

use crate::http::{authorize, is_absolute};
use crate::{HttpSettings, LegacySource};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Upstream returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Not a fetchable URL: {0}")]
    InvalidUrl(String),

    #[error("Body of {url} is {size} bytes, over the {max} byte limit")]
    TooLarge { url: String, size: u64, max: u64 },
}

impl FetchError {
    pub fn network(url: &str, reason: impl ToString) -> Self {
        FetchError::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Upstream answered, but not with 2xx.
    pub fn is_status(&self) -> bool {
        matches!(self, FetchError::Status { .. })
    }
}

/// An open upstream response.
pub struct FetchedImage {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for FetchedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedImage")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// A fully-buffered upstream response.
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Where image bytes come from. One attempt per call, no retry.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Open the URL for streaming. Non-2xx answers are `FetchError::Status`.
    async fn open(&self, url: &str) -> Result<FetchedImage, FetchError>;

    /// Open and drain the body. A declared length over `max_bytes` is refused
    /// before anything is read; an undeclared one stops at the limit.
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<FetchedBytes, FetchError> {
        let image = self.open(url).await?;
        if let Some(size) = image.content_length.filter(|size| *size > max_bytes) {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size,
                max: max_bytes,
            });
        }
        let data = collect_stream_limited(image.body, max_bytes)
            .await
            .map_err(|err| match err {
                BlobError::TooLarge { size, max } => FetchError::TooLarge {
                    url: url.to_string(),
                    size,
                    max,
                },
                other => FetchError::network(url, other),
            })?;
        Ok(FetchedBytes {
            content_type: image.content_type,
            data,
        })
    }
}

/// `GET` with the configured user agent, fetch timeout and legacy token.
pub struct HttpImageSource {
    client: Client,
    settings: HttpSettings,
    legacy: LegacySource,
}

impl HttpImageSource {
    pub fn new(settings: HttpSettings, legacy: LegacySource) -> reqwest::Result<Self> {
        Ok(Self {
            client: settings.client()?,
            settings,
            legacy,
        })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn open(&self, url: &str) -> Result<FetchedImage, FetchError> {
        if !is_absolute(url) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let request = self.client.get(url).timeout(self.settings.fetch_timeout);
        let response = authorize(request, url, &self.legacy)
            .send()
            .await
            .map_err(|err| FetchError::network(url, err))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "upstream response");
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();
        let body: ByteStream = Box::pin(response.bytes_stream().map_err(std::io::Error::other));

        Ok(FetchedImage {
            content_type,
            content_length,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two chunks and no declared length.
    struct Chunked;

    #[async_trait]
    impl ImageSource for Chunked {
        async fn open(&self, _url: &str) -> Result<FetchedImage, FetchError> {
            Ok(FetchedImage {
                content_type: Some("image/png".into()),
                content_length: None,
                body: Box::pin(futures::stream::iter(vec![
                    Ok(Bytes::from_static(b"abc")),
                    Ok(Bytes::from_static(b"def")),
                ])),
            })
        }
    }

    #[tokio::test]
    async fn undeclared_length_is_capped_while_reading() {
        let err = Chunked.fetch("https://x/a.png", 4).await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { size: 6, max: 4, .. }), "{err}");

        let fetched = Chunked.fetch("https://x/a.png", 6).await.unwrap();
        assert_eq!(&fetched.data[..], b"abcdef");
        assert_eq!(fetched.content_type.as_deref(), Some("image/png"));
    }
}
