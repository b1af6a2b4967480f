use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, Client};
use tracing::{debug, info, warn};

use crate::{collect_stream, BlobError, BlobResult, BlobStore, ByteStream, ObjectHead, PutResult, S3Config};

/// Cache policy stamped on every uploaded image
const OBJECT_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Production S3 store (or any S3-compatible endpoint) using the AWS SDK
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from configuration. Static credentials are used when both
    /// halves are present, otherwise the SDK's default provider chain applies.
    pub async fn connect(config: &S3Config) -> BlobResult<Self> {
        let bucket = config
            .bucket
            .clone()
            .ok_or_else(|| BlobError::not_configured("s3.bucket"))?;

        let client = Self::create_client(config).await;
        info!(bucket = %bucket, region = %config.region(), "s3 store ready");
        Ok(Self { client, bucket })
    }

    /// Wrap an existing client.
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    async fn create_client(config: &S3Config) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region().to_string()));

        match (&config.access_key_id, &config.secret_access_key) {
            (Some(id), Some(secret)) => {
                let credentials = Credentials::new(id.clone(), secret.clone(), None, None, "placar");
                loader = loader.credentials_provider(credentials);
            }
            _ => warn!("s3 static credentials incomplete, using default provider chain"),
        }

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&sdk_config)
                // Custom endpoints (MinIO, RustFS...) rarely support virtual-host buckets
                .force_path_style(config.endpoint_url.is_some())
                .build(),
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> BlobError {
        BlobError::backend(err)
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult> {
        let data = collect_stream(stream).await?;
        let size_bytes = data.len() as u64;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .cache_control(OBJECT_CACHE_CONTROL)
            .body(AwsByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let result = request.send().await.map_err(Self::map_aws_error)?;
        debug!(key, size_bytes, "s3 put complete");

        Ok(PutResult {
            etag: result.e_tag().map(str::to_string),
            size_bytes,
        })
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let service = err.into_service_error();
                if service.is_not_found() {
                    BlobError::not_found(key)
                } else {
                    Self::map_aws_error(service)
                }
            })?;

        Ok(ObjectHead {
            size_bytes: result.content_length().unwrap_or(0).max(0) as u64,
            content_type: result.content_type().map(str::to_string),
            etag: result.e_tag().map(str::to_string),
            last_modified: result.last_modified().map(|dt| dt.secs()),
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
