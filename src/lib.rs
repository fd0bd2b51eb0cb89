//! Bucketsync - mirror a Cloudflare R2 bucket into a local directory
//!
//! This library lists every object under a prefix of an R2 (or other
//! S3-compatible) bucket and downloads the ones that are missing or changed
//! locally, using a fixed pool of concurrent workers.
//!
//! # Features
//!
//! - **Incremental**: Objects whose local copy already has the remote size are skipped
//! - **Safe Paths**: Keys that would escape the local root are never written
//! - **Concurrent Downloads**: A bounded number of requests in flight
//! - **Automatic Retry**: Failed objects are retried with growing delays
//! - **Progress Tracking**: Real-time progress reporting
//!
//! # Example
//!
//! ```no_run
//! use bucketsync::{Credentials, SyncConfig, Synchronizer};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig {
//!     bucket: "backups".to_string(),
//!     local_root: "./bucket_backup".into(),
//!     concurrency: 15,
//!     max_retries: 3,
//!     retry_delay: Duration::from_secs(1),
//!     prefix: "2024/".to_string(),
//!     credentials: Credentials {
//!         account_id: "account".to_string(),
//!         access_key_id: "key".to_string(),
//!         secret_access_key: "secret".to_string(),
//!     },
//!     endpoint_url: None,
//! };
//!
//! let mut synchronizer = Synchronizer::new(config)?;
//! let summary = synchronizer.sync().await?;
//! println!("{} downloaded, {} skipped", summary.downloaded, summary.skipped);
//! # Ok(())
//! # }
//! ```

mod config;
mod download;
mod error;
mod list;
mod orchestrator;
mod path;
mod pool;
mod progress;
mod store;
mod types;
mod verify;

pub use config::{
    Credentials, SyncConfig, DEFAULT_CONCURRENCY, DEFAULT_LOCAL_ROOT, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_DELAY,
};
pub use download::fetch_object;
pub use error::SyncError;
pub use list::list_all;
pub use orchestrator::Synchronizer;
pub use path::resolve_local_path;
pub use pool::run_workers;
pub use progress::ProgressReporter;
pub use store::{ListEntry, ListPage, ObjectBody, ObjectStore, R2Store};
pub use types::{DownloadOutcome, ProgressState, RemoteObject, SyncState, SyncSummary};
pub use verify::should_download;
