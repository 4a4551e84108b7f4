//! Playlist sync automation around an external download tool.
//!
//! This library downloads a configured set of playlists by invoking the
//! download tool once per playlist, then regenerates a `.m3u` index file for
//! every directory of the music library.
//!
//! # Architecture
//!
//! The application is structured into several key components:
//! - `Settings`: Option resolution from defaults, a JSON file and flags
//! - `Config`: The read-only configuration of one sync run
//! - `Downloader`: Sequential download tool invocation
//! - `Regenerator`: Playlist index file generation
//! - `DailySchedule`: Once-a-day re-run loop
//!
//! # Example
//! ```no_run
//! use playlist_sync::{Config, Downloader};
//!
//! async fn example() {
//!     let config = Config::from_env().unwrap();
//!     let downloader = Downloader::new(config);
//!     downloader.run_once().await.unwrap();
//! }
//! ```

pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod formats;
pub mod options;
pub mod playlist;
pub mod progress;
pub mod schedule;
pub mod settings;

// Re-export commonly used items
pub use config::Config;
pub use downloader::{DownloadOutcome, Downloader};
pub use error::AppError;
pub use formats::{ArtworkSize, AudioFormat, Quality};
pub use playlist::Regenerator;
pub use progress::DownloadProgress;
pub use schedule::DailySchedule;
pub use settings::Settings;
