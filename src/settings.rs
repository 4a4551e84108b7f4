//! Option resolution.
//!
//! Settings come from three sources, highest precedence first: command-line
//! overrides, the JSON settings file, and the built-in defaults in
//! [`OPTIONS`]. Two umbrella overrides are applied last: `--library` replaces
//! every per-kind library path and `--output` replaces every output pattern.

use crate::error::{AppError, Result};
use crate::formats::{ArtworkSize, AudioFormat, Quality};
use crate::options::{self, coerce, expand_path, OptionDescriptor, OptionValue, OPTIONS};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Command-line overrides, keyed by option key.
///
/// A `null` value, or an empty umbrella value, is treated as absent.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub values: Map<String, Value>,
    /// Overrides every `*_library` path.
    pub library: Option<String>,
    /// Overrides every `output_*` pattern.
    pub output: Option<String>,
}

impl Overrides {
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    fn library(&self) -> Option<&str> {
        self.library.as_deref().filter(|s| !s.is_empty())
    }

    fn output(&self) -> Option<&str> {
        self.output.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(Value::is_null) && self.library().is_none() && self.output().is_none()
    }
}

/// One coerced value per descriptor of the table it was resolved against.
#[derive(Debug, Clone, Default)]
pub struct ResolvedValues {
    values: HashMap<&'static str, OptionValue>,
}

impl ResolvedValues {
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn take(&mut self, key: &str) -> Result<OptionValue> {
        self.values
            .remove(key)
            .ok_or_else(|| AppError::Custom(format!("option '{key}' was not resolved")))
    }

    fn path(&mut self, key: &str) -> Result<PathBuf> {
        match self.take(key)? {
            OptionValue::Path(p) => Ok(p),
            other => Err(mismatch(key, other)),
        }
    }

    fn string(&mut self, key: &str) -> Result<String> {
        match self.take(key)? {
            OptionValue::Str(s) => Ok(s),
            other => Err(mismatch(key, other)),
        }
    }

    fn int(&mut self, key: &str) -> Result<i64> {
        match self.take(key)? {
            OptionValue::Int(n) => Ok(n),
            other => Err(mismatch(key, other)),
        }
    }

    fn flag(&mut self, key: &str) -> Result<bool> {
        match self.take(key)? {
            OptionValue::Bool(b) => Ok(b),
            other => Err(mismatch(key, other)),
        }
    }
}

fn mismatch(key: &str, value: OptionValue) -> AppError {
    AppError::InvalidType {
        option: key.to_string(),
        value: format!("{value:?}"),
    }
}

/// Reads the settings file, creating it with every default if it is missing.
fn load_or_create(table: &[OptionDescriptor], path: &Path) -> Result<Map<String, Value>> {
    if path.exists() {
        debug!("Reading settings file {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        return Ok(serde_json::from_reader(reader)?);
    }

    info!("Settings file {} not found, writing defaults", path.display());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let defaults: Map<String, Value> = table
        .iter()
        .map(|d| (d.key.to_string(), d.default.to_json()))
        .collect();

    let mut file = File::create(path)?;
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut file, formatter);
    serde::Serialize::serialize(&defaults, &mut serializer)?;
    file.flush()?;

    Ok(defaults)
}

/// Resolves every descriptor of `table`.
///
/// Precedence per key: non-null override, then settings file, then default.
pub fn resolve_values(
    table: &[OptionDescriptor],
    config_file: Option<&Path>,
    overrides: &Overrides,
) -> Result<ResolvedValues> {
    let file_values = match config_file {
        Some(path) => load_or_create(table, path)?,
        None => Map::new(),
    };

    let mut resolved = ResolvedValues::default();
    for descriptor in table {
        let value = if let Some(raw) = overrides.get(descriptor.key) {
            coerce(descriptor, raw)?
        } else if let Some(raw) = file_values.get(descriptor.key) {
            coerce(descriptor, raw)?
        } else {
            descriptor.default_value()?
        };
        resolved.values.insert(descriptor.key, value);
    }

    Ok(resolved)
}

/// Fully resolved settings. Read-only after [`Settings::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub credentials_path: PathBuf,
    pub path_archive: PathBuf,
    pub album_library: PathBuf,
    pub podcast_library: PathBuf,
    pub playlist_library: PathBuf,
    pub output_album: String,
    pub output_playlist_track: String,
    pub output_playlist_episode: String,
    pub output_podcast: String,
    pub download_quality: Quality,
    pub artwork_size: ArtworkSize,
    pub audio_format: AudioFormat,
    pub transcode_bitrate: i64,
    pub ffmpeg_path: String,
    pub ffmpeg_args: String,
    pub save_subtitles: bool,
    pub language: String,
    pub lyrics_file: bool,
    pub lyrics_only: bool,
    pub create_playlist_file: bool,
    pub save_metadata: bool,
    pub all_artists: bool,
    pub replace_existing: bool,
    pub skip_previous: bool,
    pub skip_duplicates: bool,
    pub print_downloads: bool,
    pub print_progress: bool,
    pub print_skips: bool,
    pub print_warnings: bool,
    pub print_errors: bool,
}

impl Settings {
    /// Resolves settings from an optional settings file and command-line
    /// overrides.
    ///
    /// # Errors
    /// - The settings file cannot be read, created or parsed
    /// - A value cannot be coerced to its option's type
    pub fn resolve(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut values = resolve_values(OPTIONS, config_file, overrides)?;
        let mut settings = Self::from_values(&mut values)?;

        if let Some(library) = overrides.library() {
            let root = expand_path(library)?;
            settings.album_library = root.clone();
            settings.playlist_library = root.clone();
            settings.podcast_library = root;
        }

        if let Some(output) = overrides.output() {
            settings.output_album = output.to_string();
            settings.output_podcast = output.to_string();
            settings.output_playlist_track = output.to_string();
            settings.output_playlist_episode = output.to_string();
        }

        Ok(settings)
    }

    fn from_values(values: &mut ResolvedValues) -> Result<Self> {
        use options::*;

        let audio_format = match values.take(AUDIO_FORMAT)? {
            OptionValue::AudioFormat(f) => f,
            other => return Err(mismatch(AUDIO_FORMAT, other)),
        };
        let download_quality = match values.take(DOWNLOAD_QUALITY)? {
            OptionValue::Quality(q) => q,
            other => return Err(mismatch(DOWNLOAD_QUALITY, other)),
        };
        let artwork_size = match values.take(ARTWORK_SIZE)? {
            OptionValue::ArtworkSize(s) => s,
            other => return Err(mismatch(ARTWORK_SIZE, other)),
        };

        Ok(Self {
            credentials_path: values.path(CREDENTIALS_PATH)?,
            path_archive: values.path(PATH_ARCHIVE)?,
            album_library: values.path(ALBUM_LIBRARY)?,
            podcast_library: values.path(PODCAST_LIBRARY)?,
            playlist_library: values.path(PLAYLIST_LIBRARY)?,
            output_album: values.string(OUTPUT_ALBUM)?,
            output_playlist_track: values.string(OUTPUT_PLAYLIST_TRACK)?,
            output_playlist_episode: values.string(OUTPUT_PLAYLIST_EPISODE)?,
            output_podcast: values.string(OUTPUT_PODCAST)?,
            download_quality,
            artwork_size,
            audio_format,
            transcode_bitrate: values.int(TRANSCODE_BITRATE)?,
            ffmpeg_path: values.string(FFMPEG_PATH)?,
            ffmpeg_args: values.string(FFMPEG_ARGS)?,
            save_subtitles: values.flag(SAVE_SUBTITLES)?,
            language: values.string(LANGUAGE)?,
            lyrics_file: values.flag(LYRICS_FILE)?,
            lyrics_only: values.flag(LYRICS_ONLY)?,
            create_playlist_file: values.flag(CREATE_PLAYLIST_FILE)?,
            save_metadata: values.flag(SAVE_METADATA)?,
            all_artists: values.flag(ALL_ARTISTS)?,
            replace_existing: values.flag(REPLACE_EXISTING)?,
            skip_previous: values.flag(SKIP_PREVIOUS)?,
            skip_duplicates: values.flag(SKIP_DUPLICATES)?,
            print_downloads: values.flag(PRINT_DOWNLOADS)?,
            print_progress: values.flag(PRINT_PROGRESS)?,
            print_skips: values.flag(PRINT_SKIPS)?,
            print_warnings: values.flag(PRINT_WARNINGS)?,
            print_errors: values.flag(PRINT_ERRORS)?,
        })
    }

    /// Looks up a resolved value by option key.
    pub fn get(&self, key: &str) -> Option<OptionValue> {
        use options::*;

        let value = match key {
            CREDENTIALS_PATH => OptionValue::Path(self.credentials_path.clone()),
            PATH_ARCHIVE => OptionValue::Path(self.path_archive.clone()),
            ALBUM_LIBRARY => OptionValue::Path(self.album_library.clone()),
            PODCAST_LIBRARY => OptionValue::Path(self.podcast_library.clone()),
            PLAYLIST_LIBRARY => OptionValue::Path(self.playlist_library.clone()),
            OUTPUT_ALBUM => OptionValue::Str(self.output_album.clone()),
            OUTPUT_PLAYLIST_TRACK => OptionValue::Str(self.output_playlist_track.clone()),
            OUTPUT_PLAYLIST_EPISODE => OptionValue::Str(self.output_playlist_episode.clone()),
            OUTPUT_PODCAST => OptionValue::Str(self.output_podcast.clone()),
            DOWNLOAD_QUALITY => OptionValue::Quality(self.download_quality),
            ARTWORK_SIZE => OptionValue::ArtworkSize(self.artwork_size),
            AUDIO_FORMAT => OptionValue::AudioFormat(self.audio_format),
            TRANSCODE_BITRATE => OptionValue::Int(self.transcode_bitrate),
            FFMPEG_PATH => OptionValue::Str(self.ffmpeg_path.clone()),
            FFMPEG_ARGS => OptionValue::Str(self.ffmpeg_args.clone()),
            SAVE_SUBTITLES => OptionValue::Bool(self.save_subtitles),
            LANGUAGE => OptionValue::Str(self.language.clone()),
            LYRICS_FILE => OptionValue::Bool(self.lyrics_file),
            LYRICS_ONLY => OptionValue::Bool(self.lyrics_only),
            CREATE_PLAYLIST_FILE => OptionValue::Bool(self.create_playlist_file),
            SAVE_METADATA => OptionValue::Bool(self.save_metadata),
            ALL_ARTISTS => OptionValue::Bool(self.all_artists),
            REPLACE_EXISTING => OptionValue::Bool(self.replace_existing),
            SKIP_PREVIOUS => OptionValue::Bool(self.skip_previous),
            SKIP_DUPLICATES => OptionValue::Bool(self.skip_duplicates),
            PRINT_DOWNLOADS => OptionValue::Bool(self.print_downloads),
            PRINT_PROGRESS => OptionValue::Bool(self.print_progress),
            PRINT_SKIPS => OptionValue::Bool(self.print_skips),
            PRINT_WARNINGS => OptionValue::Bool(self.print_warnings),
            PRINT_ERRORS => OptionValue::Bool(self.print_errors),
            _ => return None,
        };
        Some(value)
    }
}
