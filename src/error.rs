//! Error types for sync operations.

use std::io;
use thiserror::Error;

/// Errors that can occur during a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// I/O error during file operations.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// A required setting was not provided.
    #[error("Missing required setting: {0}")]
    MissingConfig(&'static str),

    /// A setting was provided with an unusable value.
    #[error("Invalid setting {name}: {reason}")]
    InvalidConfig {
        /// Name of the offending setting.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Request to the remote object store failed.
    #[error("Object store request failed: {0}")]
    Store(String),

    /// The store answered a get request without a body.
    #[error("Object {0} has no body")]
    MissingBody(String),

    /// Listing the bucket failed; the run is aborted.
    #[error("Sync failed while listing objects: {0}")]
    Listing(Box<SyncError>),

    /// A download worker terminated abnormally.
    #[error("Download worker failed: {0}")]
    WorkerFailed(String),
}

impl SyncError {
    /// Returns `true` for errors that abort the run before any object is fetched.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            SyncError::MissingConfig(_) | SyncError::InvalidConfig { .. }
        )
    }
}
