//! # R2 storage client (CLI <-> core)
//!
//! Bridges the [`ObjectStore`] capability trait from `r2sync-core` to a real
//! S3-compatible client pointed at the Cloudflare R2 endpoint for the
//! configured account. All transport, streaming and SDK error handling are
//! encapsulated here; the engine only sees the trait.
//!
//! Bodies are streamed in both directions: puts use `ByteStream::from_path`
//! and gets pipe the response body to the destination file with
//! `tokio::io::copy`, so no whole file is ever buffered in memory.

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use r2sync_core::contract::{ListPage, ObjectStore, RemoteObject, StoreError};

use crate::load_config::CliConfig;

/// S3-compatible client bound to one R2 bucket.
pub struct R2Client {
    client: Client,
    bucket: String,
}

impl R2Client {
    /// Build a client for the account and bucket in the given configuration.
    pub async fn new(config: &CliConfig) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "r2sync",
        );
        let endpoint = format!("https://{}.r2.cloudflarestorage.com", config.account_id);
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .load()
            .await;
        Self {
            client: Client::new(&aws_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for R2Client {
    async fn list<'a>(
        &self,
        prefix: Option<&'a str>,
        continuation: Option<&'a str>,
    ) -> Result<ListPage, StoreError> {
        let mut request = self.client.list_objects_v2().bucket(&self.bucket);
        if let Some(prefix) = prefix {
            request = request.prefix(prefix);
        }
        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }
        let response = request.send().await?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|object| {
                object.key().map(|key| RemoteObject {
                    key: key.to_string(),
                    size: object.size().map(|s| s as u64),
                })
            })
            .collect();
        let next_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };
        debug!(bucket = %self.bucket, ?prefix, truncated = next_token.is_some(), "Listed one page");
        Ok(ListPage {
            objects,
            next_token,
        })
    }

    async fn get(&self, key: &str, dest: &Path) -> Result<u64, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        let mut reader = response.body.into_async_read();
        let mut file = tokio::fs::File::create(dest).await?;
        let bytes = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;
        Ok(bytes)
    }

    async fn put(
        &self,
        key: &str,
        source: &Path,
        content_type: &str,
        cache_control: &str,
    ) -> Result<u64, StoreError> {
        let bytes = tokio::fs::metadata(source).await?.len();
        let body = ByteStream::from_path(source).await?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await?;
        Ok(bytes)
    }
}
