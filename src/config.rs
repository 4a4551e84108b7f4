//! Configuration of a sync run.
//!
//! Loaded once at start-up, either from the environment or from resolved
//! [`Settings`], and passed read-only to everything downstream.

use crate::cli::parse_time;
use crate::error::{AppError, Result};
use crate::formats::{AudioFormat, Quality};
use crate::options::expand_path;
use crate::settings::Settings;
use chrono::NaiveTime;
use std::env;
use std::path::PathBuf;
use tracing::info;

pub const CREDENTIAL_LOCATION: &str = "CREDENTIAL_LOCATION";
pub const SONG_ARCHIVE: &str = "SONG_ARCHIVE";
pub const ROOT_PATH: &str = "ROOT_PATH";
pub const DOWNLOAD_FORMAT: &str = "DOWNLOAD_FORMAT";
pub const DOWNLOAD_QUALITY: &str = "DOWNLOAD_QUALITY";
pub const PLAYLISTS: &str = "PLAYLISTS";
pub const ZOTIFY_BIN: &str = "ZOTIFY_BIN";
pub const SCHEDULE_TIME: &str = "SCHEDULE_TIME";

pub const DEFAULT_TOOL: &str = "zotify";

/// Configuration for the playlist sync application.
///
/// # Examples
///
/// ```
/// use playlist_sync::Config;
/// use playlist_sync::Settings;
/// use playlist_sync::settings::Overrides;
///
/// let settings = Settings::resolve(None, &Overrides::default()).unwrap();
/// let config = Config::from_settings(&settings, "https://open.spotify.com/playlist/abc");
/// assert_eq!(config.playlists.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tool: String,
    pub credentials_path: PathBuf,
    pub archive_path: PathBuf,
    pub root_path: PathBuf,
    pub audio_format: AudioFormat,
    pub quality: Quality,
    pub playlists: Vec<String>,
    pub daily_at: Option<NaiveTime>,
}

impl Config {
    /// Reads the run configuration from environment variables.
    ///
    /// # Errors
    /// - A required variable is unset
    /// - `DOWNLOAD_FORMAT` / `DOWNLOAD_QUALITY` is not a known choice
    /// - `SCHEDULE_TIME` is not a `HH:MM` time
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::MissingEnv(key.to_string()))
        };

        let mut config = Self {
            tool: DEFAULT_TOOL.to_string(),
            credentials_path: expand_path(&required(CREDENTIAL_LOCATION)?)?,
            archive_path: expand_path(&required(SONG_ARCHIVE)?)?,
            root_path: expand_path(&required(ROOT_PATH)?)?,
            audio_format: required(DOWNLOAD_FORMAT)?.parse()?,
            quality: required(DOWNLOAD_QUALITY)?.parse()?,
            playlists: split_playlists(&required(PLAYLISTS)?),
            daily_at: None,
        };
        config.apply_optional_env(&lookup)?;
        Ok(config)
    }

    /// Applies `ZOTIFY_BIN` and `SCHEDULE_TIME` when they are set.
    ///
    /// # Errors
    /// `SCHEDULE_TIME` is not a `HH:MM` time
    pub fn apply_optional_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(tool) = optional(ZOTIFY_BIN) {
            self.tool = tool;
        }
        if let Some(raw) = optional(SCHEDULE_TIME) {
            self.daily_at = Some(parse_time(&raw)?);
        }
        Ok(())
    }

    /// Builds the run configuration from resolved settings.
    ///
    /// Downloads land in the playlist library, which is also the root the
    /// playlist index files are regenerated under.
    pub fn from_settings(settings: &Settings, playlists: &str) -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            credentials_path: settings.credentials_path.clone(),
            archive_path: settings.path_archive.clone(),
            root_path: settings.playlist_library.clone(),
            audio_format: settings.audio_format,
            quality: settings.download_quality,
            playlists: split_playlists(playlists),
            daily_at: None,
        }
    }

    /// Reports a missing credential file as an error value.
    ///
    /// The caller decides whether to continue; the download tool may still
    /// be able to prompt for a login.
    pub fn check_credentials(&self) -> Result<()> {
        if self.credentials_path.is_file() {
            Ok(())
        } else {
            Err(AppError::CredentialsMissing(self.credentials_path.clone()))
        }
    }

    /// Logs the effective configuration.
    pub fn log_summary(&self) {
        info!("Download tool: {}", self.tool);
        info!("Song archive: {}", self.archive_path.display());
        info!("Root path: {}", self.root_path.display());
        info!("Download format: {}", self.audio_format);
        info!("Download quality: {}", self.quality);
        info!("Playlists: {}", self.playlists.join(", "));
        if let Some(at) = self.daily_at {
            info!("Daily run at: {}", at.format("%H:%M"));
        }
    }
}

/// Splits a `", "`-delimited playlist list, dropping empty entries.
pub fn split_playlists(raw: &str) -> Vec<String> {
    raw.split(", ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (CREDENTIAL_LOCATION, "/data/credentials.json"),
            (SONG_ARCHIVE, "/data/archive"),
            (ROOT_PATH, "/music"),
            (DOWNLOAD_FORMAT, "mp3"),
            (DOWNLOAD_QUALITY, "very_high"),
            (PLAYLISTS, "https://open.spotify.com/playlist/a, https://open.spotify.com/playlist/b"),
        ]
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&full_env())).unwrap();
        assert_eq!(config.tool, DEFAULT_TOOL);
        assert_eq!(config.root_path, PathBuf::from("/music"));
        assert_eq!(config.audio_format, AudioFormat::Mp3);
        assert_eq!(config.quality, Quality::VeryHigh);
        assert_eq!(config.playlists.len(), 2);
        assert!(config.daily_at.is_none());
    }

    #[test]
    fn optional_variables_are_honoured() {
        let mut vars = full_env();
        vars.push((ZOTIFY_BIN, "/opt/zotify/bin/zotify"));
        vars.push((SCHEDULE_TIME, "04:15"));

        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.tool, "/opt/zotify/bin/zotify");
        assert_eq!(config.daily_at, NaiveTime::from_hms_opt(4, 15, 0));
    }

    #[test]
    fn settings_mode_reads_the_same_optional_variables() {
        let settings = Settings::resolve(None, &Default::default()).unwrap();
        let mut config = Config::from_settings(&settings, "spotify:playlist:a");
        config
            .apply_optional_env(lookup_from(&[
                (ZOTIFY_BIN, "/opt/zotify/bin/zotify"),
                (SCHEDULE_TIME, "04:15"),
            ]))
            .unwrap();
        assert_eq!(config.tool, "/opt/zotify/bin/zotify");
        assert_eq!(config.daily_at, NaiveTime::from_hms_opt(4, 15, 0));

        let mut untouched = Config::from_settings(&settings, "spotify:playlist:a");
        untouched.apply_optional_env(lookup_from(&[(SCHEDULE_TIME, " ")])).unwrap();
        assert_eq!(untouched.tool, DEFAULT_TOOL);
        assert!(untouched.daily_at.is_none());

        assert!(untouched
            .apply_optional_env(lookup_from(&[(SCHEDULE_TIME, "later")]))
            .is_err());
    }

    #[test]
    fn missing_variable_is_named() {
        let vars: Vec<_> = full_env()
            .into_iter()
            .filter(|(k, _)| *k != ROOT_PATH)
            .collect();
        match Config::from_lookup(lookup_from(&vars)).unwrap_err() {
            AppError::MissingEnv(name) => assert_eq!(name, ROOT_PATH),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_format_fails_fast() {
        let mut vars = full_env();
        vars.retain(|(k, _)| *k != DOWNLOAD_FORMAT);
        vars.push((DOWNLOAD_FORMAT, "wma"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&vars)),
            Err(AppError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn playlists_split_on_comma_space() {
        assert_eq!(
            split_playlists("spotify:playlist:a, spotify:playlist:b,  , "),
            vec!["spotify:playlist:a", "spotify:playlist:b"]
        );
        assert!(split_playlists("").is_empty());
    }

    #[test]
    fn credential_check_reports_missing_file() {
        let dir = tempdir().unwrap();
        let mut config = Config::from_lookup(lookup_from(&full_env())).unwrap();
        config.credentials_path = dir.path().join("credentials.json");

        assert!(matches!(
            config.check_credentials(),
            Err(AppError::CredentialsMissing(_))
        ));

        fs::write(&config.credentials_path, "{}").unwrap();
        assert!(config.check_credentials().is_ok());
    }
}
