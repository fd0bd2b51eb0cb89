//! Data structures shared across a sync run.

use serde::{Deserialize, Serialize};

/// An object found under the configured prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// `/`-delimited object key, never empty.
    pub key: String,
    /// Size in bytes as reported by the listing, if the backend sent one.
    pub size: Option<u64>,
}

impl RemoteObject {
    pub fn new(key: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// Result of processing a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Object was fetched and written locally.
    Downloaded,
    /// Object was already present, or its key was unsafe.
    Skipped,
    /// Object could not be fetched within the retry budget.
    Failed,
}

/// Progress counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub total: u64,
    pub completed: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl ProgressState {
    /// Number of objects actually written during the run.
    pub fn downloaded(&self) -> u64 {
        self.completed - self.skipped - self.failed
    }
}

/// Final report returned by [`crate::Synchronizer::sync`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Objects found by the listing.
    pub total: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl From<ProgressState> for SyncSummary {
    fn from(state: ProgressState) -> Self {
        Self {
            total: state.total,
            downloaded: state.downloaded(),
            skipped: state.skipped,
            failed: state.failed,
        }
    }
}

/// Lifecycle of a [`crate::Synchronizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing has run yet
    Idle,
    /// Paginating through the bucket listing
    Listing,
    /// Workers are fetching objects
    Downloading,
    /// Run finished; per-object failures may still have occurred
    Done,
    /// Listing failed, nothing was downloaded
    Failed,
    /// Orchestration broke down mid-download
    FailedFatal,
}
