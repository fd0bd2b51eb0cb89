//! Single object download with retry.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::path::resolve_local_path;
use crate::store::{ObjectBody, ObjectStore};
use crate::types::{DownloadOutcome, RemoteObject};
use crate::verify::should_download;
use futures_util::StreamExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, error, warn};

/// Delays between attempts: `base`, `2 * base`, ... `max_retries * base`.
///
/// The iterator is finite, so an object is attempted at most
/// `max_retries + 1` times.
pub(crate) fn retry_delays(base: Duration, max_retries: u32) -> impl Iterator<Item = Duration> {
    (1..=max_retries).map(move |attempt| base * attempt)
}

/// Sequence number keeping temp files of concurrent attempts apart.
static PARTIAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Hidden sibling the body is streamed into before it replaces `dest`.
///
/// Every call returns a fresh name, so two keys normalizing to the same
/// destination never share a temp file.
fn partial_path(dest: &Path) -> PathBuf {
    let seq = PARTIAL_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or_default());
    name.push(format!(".{}-{}.part", std::process::id(), seq));
    dest.with_file_name(name)
}

/// Keys ending in a separator are folder markers, not objects.
fn is_directory_marker(key: &str) -> bool {
    key.ends_with('/') || key.ends_with('\\')
}

/// Streams `body` into `dest`, replacing any existing file only once the
/// whole body has been written.
async fn write_body(mut body: ObjectBody, dest: &Path) -> Result<u64, SyncError> {
    let partial = partial_path(dest);

    let result = async {
        let mut file = BufWriter::new(tokio::fs::File::create(&partial).await?);
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok::<u64, SyncError>(written)
    }
    .await;

    let result = match result {
        Ok(written) => tokio::fs::rename(&partial, dest)
            .await
            .map(|_| written)
            .map_err(SyncError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(written) => Ok(written),
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

/// One attempt at fetching `key` into `dest`.
async fn download_once(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    dest: &Path,
) -> Result<u64, SyncError> {
    let body = store
        .get_object(bucket, key)
        .await?
        .ok_or_else(|| SyncError::MissingBody(key.to_string()))?;
    write_body(body, dest).await
}

/// Mirrors a single object into the local root.
///
/// Keys ending in `/` or `\` are folder markers: their directory is created
/// and they are reported as skipped without being fetched.
///
/// The object is skipped when its key cannot be mapped safely under
/// `config.local_root`, when it would land on a directory, or when a local
/// file of the same size already exists. Otherwise it is downloaded, retrying
/// failed attempts up to `config.max_retries` times with a delay that grows
/// linearly with the attempt number.
///
/// Never returns an error: a download that keeps failing is logged and
/// reported as [`DownloadOutcome::Failed`].
///
/// # Arguments
///
/// * `store` - Object store to fetch from
/// * `config` - Run configuration
/// * `object` - Object to mirror
pub async fn fetch_object(
    store: &dyn ObjectStore,
    config: &SyncConfig,
    object: &RemoteObject,
) -> DownloadOutcome {
    let key = object.key.as_str();

    let dest = match resolve_local_path(&config.local_root, key) {
        Some(path) => path,
        None => {
            warn!("⚠️  Skipping suspicious key: {}", key);
            return DownloadOutcome::Skipped;
        }
    };

    if is_directory_marker(key) {
        return match tokio::fs::create_dir_all(&dest).await {
            Ok(()) => {
                debug!("Created directory {} for marker {}", dest.display(), key);
                DownloadOutcome::Skipped
            }
            Err(e) => {
                error!(
                    "✖ Cannot create directory {} for {}: {}",
                    dest.display(),
                    key,
                    e
                );
                DownloadOutcome::Failed
            }
        };
    }

    if dest == config.local_root || tokio::fs::metadata(&dest).await.is_ok_and(|m| m.is_dir()) {
        warn!(
            "⚠️  Skipping {}: resolves to directory {}",
            key,
            dest.display()
        );
        return DownloadOutcome::Skipped;
    }

    if !should_download(&dest, object.size).await {
        debug!("Skipping {}: local copy matches", key);
        return DownloadOutcome::Skipped;
    }

    if let Some(parent) = dest.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            error!(
                "✖ Cannot create directory {} for {}: {}",
                parent.display(),
                key,
                e
            );
            return DownloadOutcome::Failed;
        }
    }

    let max_retries = config.max_retries;
    let dest = dest.as_path();
    let mut attempt = 0u32;

    let result = Retry::spawn(retry_delays(config.retry_delay, max_retries), || {
        attempt += 1;
        let attempt = attempt;

        async move {
            match download_once(store, &config.bucket, key, dest).await {
                Ok(written) => Ok(written),
                Err(e) => {
                    if attempt <= max_retries {
                        warn!("⟳ Retrying ({}/{}) → {}: {}", attempt, max_retries, key, e);
                    }
                    RetryError::to_transient(e)
                }
            }
        }
    })
    .await;

    match result {
        Ok(written) => {
            debug!("Downloaded {} ({} bytes)", key, written);
            DownloadOutcome::Downloaded
        }
        Err(e) => {
            error!("✖ Permanent failure downloading {}: {}", key, e);
            DownloadOutcome::Failed
        }
    }
}
