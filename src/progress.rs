use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Progress tracking for a batch of playlist downloads.
///
/// Keeps counts of finished and failed playlists, a time estimate for the
/// rest of the batch, and the failure messages for the final summary.
///
/// # Examples
///
/// ```
/// use playlist_sync::DownloadProgress;
///
/// let mut progress = DownloadProgress::new(2);
/// progress.update(true);
/// progress.record_failure("spotify:playlist:x", "exit status 1".to_string());
/// progress.update(false);
/// assert_eq!(progress.succeeded(), 1);
/// ```
#[derive(Debug)]
pub struct DownloadProgress {
    pub total: usize,
    pub completed: usize,
    pub start_time: Instant,
    pub errors: usize,
    failures: Vec<(String, String)>, // (playlist, error message)
}

impl DownloadProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            start_time: Instant::now(),
            errors: 0,
            failures: Vec::new(),
        }
    }

    pub fn update(&mut self, success: bool) {
        self.completed += 1;
        if !success {
            self.errors += 1;
        }
        self.log_progress();
    }

    pub fn succeeded(&self) -> usize {
        self.completed - self.errors
    }

    pub fn failures(&self) -> &[(String, String)] {
        &self.failures
    }

    /// Estimated time left, extrapolated from the average so far.
    pub fn remaining(&self) -> Duration {
        if self.completed == 0 {
            return Duration::ZERO;
        }
        let average = self.start_time.elapsed().div_f64(self.completed as f64);
        average.mul_f64(self.total.saturating_sub(self.completed) as f64)
    }

    pub fn log_progress(&self) {
        let percent = if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        };

        info!(
            "Progress: {}/{} playlists ({:.1}%), elapsed {:.1}s, remaining ~{:.1}s",
            self.completed,
            self.total,
            percent,
            self.start_time.elapsed().as_secs_f64(),
            self.remaining().as_secs_f64()
        );
    }

    pub fn record_failure(&mut self, playlist: &str, error: String) {
        self.failures.push((playlist.to_string(), error));
    }

    /// Logs the end-of-batch summary, one warning per failed playlist.
    pub fn log_summary(&self) {
        info!(
            "Download summary: {} succeeded, {} failed in {:.1}s",
            self.succeeded(),
            self.errors,
            self.start_time.elapsed().as_secs_f64()
        );
        for (playlist, error) in &self.failures {
            warn!("Failed playlist {}: {}", playlist, error);
        }
    }
}
