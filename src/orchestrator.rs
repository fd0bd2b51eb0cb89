//! Main orchestration logic for a sync run.

use crate::config::SyncConfig;
use crate::download::fetch_object;
use crate::error::SyncError;
use crate::list::list_all;
use crate::pool::run_workers;
use crate::progress::ProgressReporter;
use crate::store::{ObjectStore, R2Store};
use crate::types::{RemoteObject, SyncState, SyncSummary};
use std::sync::Arc;
use tracing::{error, info};

/// Mirrors one bucket prefix into a local directory.
pub struct Synchronizer {
    config: Arc<SyncConfig>,
    store: Arc<dyn ObjectStore>,
    state: SyncState,
    show_progress: bool,
}

impl Synchronizer {
    /// Validates `config` and connects to R2 with its credentials.
    ///
    /// No network request is made until [`sync`](Self::sync) is called.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let store = Arc::new(R2Store::new(&config));
        Self::with_store(config, store)
    }

    /// Validates `config` and uses `store` for all remote access.
    pub fn with_store(config: SyncConfig, store: Arc<dyn ObjectStore>) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            store,
            state: SyncState::Idle,
            show_progress: true,
        })
    }

    /// Enables or disables the progress bar (enabled by default).
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Where the last (or current) run stands.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Lists the bucket and downloads every missing or changed object.
    ///
    /// This performs the following steps:
    ///
    /// 1. Lists every object under the configured prefix
    /// 2. Downloads them with `concurrency` workers, skipping unchanged files
    /// 3. Returns the final counts
    ///
    /// Objects that fail after all retries are counted in the summary and do
    /// not fail the run.
    ///
    /// # Returns
    ///
    /// The run summary, or [`SyncError::Listing`] if the bucket could not be
    /// listed, or [`SyncError::WorkerFailed`] if a worker broke down.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bucketsync::{Credentials, SyncConfig, Synchronizer};
    /// use std::time::Duration;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
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
    ///
    /// let summary = Synchronizer::new(config)?.sync().await?;
    /// println!("{} downloaded", summary.downloaded);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn sync(&mut self) -> Result<SyncSummary, SyncError> {
        self.state = SyncState::Listing;
        info!("📥 Listing objects in bucket {}...", self.config.bucket);

        let objects =
            match list_all(self.store.as_ref(), &self.config.bucket, &self.config.prefix).await {
                Ok(objects) => objects,
                Err(e) => {
                    self.state = SyncState::Failed;
                    error!("❌ Listing failed: {}", e);
                    return Err(SyncError::Listing(Box::new(e)));
                }
            };

        info!("📦 Total objects found: {}", objects.len());
        info!("🚀 Starting sync into {}", self.config.local_root.display());
        self.state = SyncState::Downloading;

        let total = objects.len() as u64;
        let progress = if self.show_progress {
            ProgressReporter::start(total)
        } else {
            ProgressReporter::hidden(total)
        };

        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);
        let result = run_workers(
            objects,
            self.config.concurrency,
            &progress,
            move |object: RemoteObject| {
                let store = Arc::clone(&store);
                let config = Arc::clone(&config);
                async move { fetch_object(store.as_ref(), &config, &object).await }
            },
        )
        .await;

        let summary = SyncSummary::from(progress.stop());

        if let Err(e) = result {
            self.state = SyncState::FailedFatal;
            error!("❌ Sync aborted: {}", e);
            return Err(e);
        }

        self.state = SyncState::Done;
        info!(
            "🎉 Sync complete: {} objects ({} downloaded, {} skipped, {} failed)",
            summary.total, summary.downloaded, summary.skipped, summary.failed
        );
        Ok(summary)
    }
}
