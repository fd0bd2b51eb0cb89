//! Local file checks deciding whether an object needs to be fetched.

use std::path::Path;
use tracing::debug;

/// Decides whether the object at `local_path` must be downloaded.
///
/// This function performs the following checks:
/// 1. If no local file exists, the object is downloaded
/// 2. If the remote size is unknown, the object is downloaded again
/// 3. Otherwise the object is downloaded unless the local byte length
///    equals `remote_size`
///
/// Equal size is taken to mean "same object". It is a cheap heuristic, not a
/// content check.
///
/// # Arguments
///
/// * `local_path` - Destination path of the object
/// * `remote_size` - Size reported by the listing, if any
///
/// # Returns
///
/// `true` if the object must be fetched, `false` if the local copy is kept.
pub async fn should_download(local_path: &Path, remote_size: Option<u64>) -> bool {
    let local_metadata = match tokio::fs::metadata(local_path).await {
        Ok(m) => m,
        Err(_) => return true,
    };

    match remote_size {
        Some(remote_size) if local_metadata.len() == remote_size => {
            debug!(
                "Local copy of {} is up to date ({} bytes)",
                local_path.display(),
                remote_size
            );
            false
        }
        Some(remote_size) => {
            debug!(
                "Size mismatch for {}: local={} bytes, remote={} bytes",
                local_path.display(),
                local_metadata.len(),
                remote_size
            );
            true
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");

        assert!(should_download(&path, Some(0)).await);
        assert!(should_download(&path, Some(42)).await);
        assert!(should_download(&path, None).await);
    }

    #[tokio::test]
    async fn test_existing_file_compared_by_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"hello").unwrap();

        assert!(!should_download(&path, Some(5)).await);
        assert!(should_download(&path, Some(4)).await);
        assert!(should_download(&path, Some(6)).await);
        assert!(should_download(&path, None).await);
    }

    #[tokio::test]
    async fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        assert!(!should_download(&path, Some(0)).await);
        assert!(should_download(&path, Some(1)).await);
    }
}
