//! Sync run configuration.

use crate::error::SyncError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default local destination directory.
pub const DEFAULT_LOCAL_ROOT: &str = "./bucket_backup";
/// Default number of concurrent download workers.
pub const DEFAULT_CONCURRENCY: usize = 15;
/// Default number of retries after a failed object download.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay between retries; attempt `n` waits `n` times this.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// R2 account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Cloudflare account id, used to derive the storage endpoint.
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Configuration for one sync run.
///
/// Every value is resolved by the caller before the
/// [`Synchronizer`](crate::Synchronizer) is built; the core never falls back
/// to defaults on its own.
///
/// # Example
///
/// ```
/// use bucketsync::{Credentials, SyncConfig};
/// use std::time::Duration;
///
/// let config = SyncConfig {
///     bucket: "backups".to_string(),
///     local_root: "./bucket_backup".into(),
///     concurrency: 15,
///     max_retries: 3,
///     retry_delay: Duration::from_secs(1),
///     prefix: String::new(),
///     credentials: Credentials {
///         account_id: "account".to_string(),
///         access_key_id: "key".to_string(),
///         secret_access_key: "secret".to_string(),
///     },
///     endpoint_url: None,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Bucket to mirror.
    pub bucket: String,
    /// Local directory objects are written under.
    pub local_root: PathBuf,
    /// Number of workers fetching objects at the same time.
    ///
    /// Downloads are network-bound, so this is the number of in-flight
    /// requests rather than a CPU limit.
    pub concurrency: usize,
    /// Retries per object after the first failed attempt.
    pub max_retries: u32,
    /// Base delay between attempts.
    pub retry_delay: Duration,
    /// Only keys starting with this prefix are mirrored. Empty means the whole bucket.
    pub prefix: String,
    pub credentials: Credentials,
    /// Overrides the endpoint derived from the account id (S3-compatible stores, local testing).
    pub endpoint_url: Option<String>,
}

impl SyncConfig {
    /// Checks that every required setting is present and usable.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.bucket.trim().is_empty() {
            return Err(SyncError::MissingConfig("bucket name"));
        }
        if self.credentials.account_id.trim().is_empty() && self.endpoint_url.is_none() {
            return Err(SyncError::MissingConfig("account id"));
        }
        if self.credentials.access_key_id.is_empty() {
            return Err(SyncError::MissingConfig("access key"));
        }
        if self.credentials.secret_access_key.is_empty() {
            return Err(SyncError::MissingConfig("secret key"));
        }
        if self.local_root.as_os_str().is_empty() {
            return Err(SyncError::MissingConfig("local root"));
        }
        if self.concurrency == 0 {
            return Err(SyncError::InvalidConfig {
                name: "concurrency",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Storage endpoint the client talks to.
    pub fn endpoint(&self) -> String {
        match &self.endpoint_url {
            Some(url) => url.clone(),
            None => format!(
                "https://{}.r2.cloudflarestorage.com",
                self.credentials.account_id
            ),
        }
    }
}
