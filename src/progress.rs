//! Operator-facing progress display.

use crate::types::{DownloadOutcome, ProgressState};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex, MutexGuard};

/// Tracks completed, skipped and failed objects and renders them as a progress bar.
///
/// Cloning is cheap; every clone shares the same counters and bar, so each
/// worker can hold its own handle.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    state: Arc<Mutex<ProgressState>>,
}

impl ProgressReporter {
    /// Starts a display at `0/total`.
    ///
    /// The bar is only drawn when stderr is a terminal.
    pub fn start(total: u64) -> Self {
        let bar = if atty::is(atty::Stream::Stderr) {
            ProgressBar::new(total)
        } else {
            ProgressBar::hidden()
        };
        Self::with_bar(bar, total)
    }

    /// Starts a reporter that never draws anything.
    pub fn hidden(total: u64) -> Self {
        Self::with_bar(ProgressBar::hidden(), total)
    }

    fn with_bar(bar: ProgressBar, total: u64) -> Self {
        bar.set_length(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files {msg} | {elapsed_precise} elapsed, ETA {eta_precise}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░ "),
        );
        bar.set_message("| 0 skipped, 0 failed");

        Self {
            bar,
            state: Arc::new(Mutex::new(ProgressState {
                total,
                ..ProgressState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records one processed object and re-renders.
    pub fn report(&self, outcome: DownloadOutcome) {
        let mut state = self.lock();
        state.completed += 1;
        match outcome {
            DownloadOutcome::Downloaded => {}
            DownloadOutcome::Skipped => state.skipped += 1,
            DownloadOutcome::Failed => state.failed += 1,
        }
        self.bar
            .set_message(format!("| {} skipped, {} failed", state.skipped, state.failed));
        self.bar.inc(1);
    }

    /// Current counters.
    pub fn snapshot(&self) -> ProgressState {
        *self.lock()
    }

    /// Finalizes the display and returns the final counters.
    pub fn stop(&self) -> ProgressState {
        let state = self.snapshot();
        self.bar.finish_with_message(format!(
            "| {} downloaded, {} skipped, {} failed",
            state.downloaded(),
            state.skipped,
            state.failed
        ));
        state
    }
}
