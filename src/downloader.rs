use crate::{config::Config, error::Result, playlist::Regenerator, progress::DownloadProgress};

use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, error, info, instrument, warn};

/// Result of one download tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The tool exited with status 0.
    Success { stdout: String },
    /// The tool exited non-zero or could not be started.
    Failure { status: Option<i32>, stderr: String },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }
}

/// Drives the external download tool, one playlist at a time.
///
/// # Fields
/// * `config` - Run configuration shared with the regeneration step
/// * `regenerator` - Writes playlist index files once downloads finish
pub struct Downloader {
    config: Arc<Config>,
    regenerator: Regenerator,
}

impl Downloader {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            regenerator: Regenerator::default(),
        }
    }

    pub fn with_regenerator(mut self, regenerator: Regenerator) -> Self {
        self.regenerator = regenerator;
        self
    }

    /// Builds the tool invocation for one playlist.
    ///
    /// Existing files and previously archived songs are always skipped.
    pub fn command(&self, playlist: &str) -> Command {
        let config = &self.config;
        let mut command = Command::new(&config.tool);
        command
            .arg("--credentials-location")
            .arg(&config.credentials_path)
            .arg("--song-archive")
            .arg(&config.archive_path)
            .arg("--root-path")
            .arg(&config.root_path)
            .arg("--download-format")
            .arg(config.audio_format.as_str())
            .arg("--download-quality")
            .arg(config.quality.as_str())
            .arg("--skip-existing")
            .arg("True")
            .arg("--skip-previously-downloaded")
            .arg("True")
            .arg(playlist)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    /// Runs the download tool for one playlist and waits for it to exit.
    ///
    /// Never fails: every problem is folded into a [`DownloadOutcome::Failure`].
    #[instrument(skip(self))]
    pub async fn download_playlist(&self, playlist: &str) -> DownloadOutcome {
        info!("Downloading playlist: {}", playlist);

        let output = match self.command(playlist).output().await {
            Ok(output) => output,
            Err(e) => {
                return DownloadOutcome::Failure {
                    status: None,
                    stderr: format!("failed to start {}: {}", self.config.tool, e),
                }
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            DownloadOutcome::Success { stdout }
        } else {
            DownloadOutcome::Failure {
                status: output.status.code(),
                stderr,
            }
        }
    }

    /// Downloads every configured playlist in order.
    ///
    /// A failed playlist is logged and recorded; it never stops the rest of
    /// the batch.
    pub async fn process_playlists(&self) -> DownloadProgress {
        let playlists = &self.config.playlists;
        info!("Found {} playlists to download", playlists.len());
        let mut progress = DownloadProgress::new(playlists.len());

        for playlist in playlists {
            let outcome = self.download_playlist(playlist).await;
            match &outcome {
                DownloadOutcome::Success { stdout } => {
                    info!("Playlist was downloaded successfully: {}", playlist);
                    debug!("{}", stdout.trim_end());
                }
                DownloadOutcome::Failure { status, stderr } => {
                    let message = match status {
                        Some(code) => format!("exit status {}: {}", code, stderr.trim_end()),
                        None => stderr.trim_end().to_string(),
                    };
                    error!("Error while downloading playlist {}: {}", playlist, message);
                    progress.record_failure(playlist, message);
                }
            }
            progress.update(outcome.is_success());
        }

        progress.log_summary();
        progress
    }

    /// One full sync: download every playlist, then regenerate the index
    /// files under the root path.
    ///
    /// # Errors
    /// Returns error only if writing the index files fails; download
    /// failures are reported in the returned progress.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<DownloadProgress> {
        info!("Running sync at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

        let progress = self.process_playlists().await;

        let regenerator = self.regenerator.clone();
        let root = self.config.root_path.clone();
        let written = tokio::task::spawn_blocking(move || regenerator.regenerate(&root))
            .await
            .map_err(|e| format!("playlist regeneration panicked: {e}"))??;
        if written == 0 {
            warn!("No playlist index files were written");
        } else {
            info!("Regenerated {} playlist index files", written);
        }

        Ok(progress)
    }
}
