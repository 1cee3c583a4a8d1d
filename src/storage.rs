use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, defaults};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{Builder as S3ConfigBuilder, Region},
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

/// Object storage for catalog images.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// Public URL under which an uploaded key is served.
    fn object_url(&self, key: &str) -> String;
}

pub struct S3Storage {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3Storage {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        region: &str,
        public_base: &str,
    ) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ))
            .endpoint_url(endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: bucket.to_string(),
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

/// Fallback when no bucket is configured (local dev, tests). Accepts writes,
/// serves nothing.
pub struct NoopStorage {
    public_base: String,
}

impl NoopStorage {
    pub fn new() -> Self {
        Self {
            public_base: "https://storage.invalid".to_string(),
        }
    }
}

impl Default for NoopStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageClient for NoopStorage {
    async fn put_object(&self, key: &str, _body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        tracing::debug!(key, "noop storage: put skipped");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        tracing::debug!(key, "noop storage: delete skipped");
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

/// Build the storage client from `S3_*` env vars, falling back to the no-op
/// client when `S3_BUCKET` is unset.
pub async fn from_env() -> anyhow::Result<Arc<dyn StorageClient>> {
    let Ok(bucket) = std::env::var("S3_BUCKET") else {
        tracing::warn!("S3_BUCKET not set, image uploads will not be persisted");
        return Ok(Arc::new(NoopStorage::new()));
    };

    let endpoint = std::env::var("S3_ENDPOINT").context("S3_ENDPOINT is not set")?;
    let access_key = std::env::var("S3_ACCESS_KEY").context("S3_ACCESS_KEY is not set")?;
    let secret_key = std::env::var("S3_SECRET_KEY").context("S3_SECRET_KEY is not set")?;
    let region = std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());
    let public_base =
        std::env::var("S3_PUBLIC_URL").unwrap_or_else(|_| format!("{endpoint}/{bucket}"));

    let storage = S3Storage::new(
        &endpoint,
        &bucket,
        &access_key,
        &secret_key,
        &region,
        &public_base,
    )
    .await?;
    Ok(Arc::new(storage))
}
