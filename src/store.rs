//! Remote object store access.
//!
//! The sync core only needs two operations from a store: one page of a
//! prefix listing, and the body of a single object. [`ObjectStore`] captures
//! exactly that so the core can run against R2 in production and against an
//! in-memory store in tests.

use crate::config::SyncConfig;
use crate::error::SyncError;
use async_trait::async_trait;
use aws_config::Region;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;

/// Streamed body of an object, chunk by chunk.
pub type ObjectBody = BoxStream<'static, Result<Bytes, SyncError>>;

/// One entry of a listing page, as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEntry {
    pub key: Option<String>,
    pub size: Option<u64>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub entries: Vec<ListEntry>,
    /// More pages follow this one.
    pub is_truncated: bool,
    /// Token to pass to the next request when `is_truncated` is set.
    pub next_continuation_token: Option<String>,
}

/// Minimal list/get interface over a remote bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches one page of keys under `prefix`, continuing from `continuation_token`.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, SyncError>;

    /// Retrieves an object. `Ok(None)` means the store answered without a body.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectBody>, SyncError>;
}

/// [`ObjectStore`] backed by Cloudflare R2 through the S3 API.
#[derive(Debug, Clone)]
pub struct R2Store {
    client: Client,
}

impl R2Store {
    /// Builds an S3 client configured for the account in `config`.
    pub fn new(config: &SyncConfig) -> Self {
        let credentials = Credentials::new(
            &config.credentials.access_key_id,
            &config.credentials.secret_access_key,
            None,
            None,
            "bucketsync",
        );

        let s3_config = S3ConfigBuilder::new()
            .credentials_provider(credentials)
            .region(Region::new("auto"))
            .endpoint_url(config.endpoint())
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectStore for R2Store {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, SyncError> {
        let mut request = self.client.list_objects_v2().bucket(bucket).max_keys(1000);

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Store(DisplayErrorContext(&e).to_string()))?;

        let entries = response
            .contents()
            .iter()
            .map(|obj| ListEntry {
                key: obj.key().map(|k| k.to_string()),
                size: obj.size().and_then(|s| u64::try_from(s).ok()),
            })
            .collect();

        Ok(ListPage {
            entries,
            is_truncated: response.is_truncated().unwrap_or(false),
            next_continuation_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectBody>, SyncError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| SyncError::Store(DisplayErrorContext(&e).to_string()))?;

        let body = stream::unfold(response.body, |mut body| async move {
            body.next()
                .await
                .map(|chunk| (chunk.map_err(|e| SyncError::Store(e.to_string())), body))
        });

        Ok(Some(body.boxed()))
    }
}
