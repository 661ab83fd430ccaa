//! S3 implementation of [`ObjectStore`] using the AWS SDK.
//!
//! Supports S3-compatible services (MinIO, LocalStack) through an endpoint
//! override and path-style addressing. Credentials, retries and connection
//! pooling are left to the SDK's default chain.

use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client;
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;

use crate::config::StorageConfig;
use crate::storage::{FetchedObject, ObjectStore, StorageError};

/// [`ObjectStore`] backed by `aws_sdk_s3::Client`.
///
/// The SDK client is internally reference-counted and safe to share.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client from the default AWS provider chain plus `config`.
    pub async fn from_config(config: &StorageConfig) -> Self {
        Self {
            client: build_s3_client(config).await,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<FetchedObject, StorageError> {
        tracing::debug!(bucket = %bucket, key = %key, "s3.GetObject");

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err.code() {
                Some(code) => StorageError::Service {
                    code: code.to_string(),
                    message: err.message().map(str::to_string),
                },
                None => StorageError::opaque(err),
            })?;

        let cache_control = output.cache_control().map(str::to_string);
        let content_type = output.content_type().map(str::to_string);
        let content_length = output.content_length();

        let body = ReaderStream::new(output.body.into_async_read()).boxed();

        Ok(FetchedObject {
            body,
            cache_control,
            content_type,
            content_length,
        })
    }
}

/// Build an S3 client from configuration.
async fn build_s3_client(config: &StorageConfig) -> Client {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new(config.region.clone()))
        .load()
        .await;

    let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

    if let Some(endpoint) = &config.endpoint {
        s3_config_builder = s3_config_builder.endpoint_url(endpoint);
    }

    if config.force_path_style {
        s3_config_builder = s3_config_builder.force_path_style(true);
    }

    Client::from_conf(s3_config_builder.build())
}
