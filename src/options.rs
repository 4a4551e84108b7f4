//! Option descriptor table and value coercion.
//!
//! Every configurable setting is described once in [`OPTIONS`]: its key in the
//! settings file, its value kind, its default, the command-line spellings that
//! override it and its help text. The resolver in [`crate::settings`] walks this
//! table in order.

use crate::error::{AppError, Result};
use crate::formats::{ArtworkSize, AudioFormat, Quality};
use path_absolutize::Absolutize;
use serde_json::Value;
use std::path::PathBuf;

pub const ALBUM_LIBRARY: &str = "album_library";
pub const ALL_ARTISTS: &str = "all_artists";
pub const ARTWORK_SIZE: &str = "artwork_size";
pub const AUDIO_FORMAT: &str = "audio_format";
pub const CREATE_PLAYLIST_FILE: &str = "create_playlist_file";
pub const CREDENTIALS_PATH: &str = "credentials_path";
pub const DOWNLOAD_QUALITY: &str = "download_quality";
pub const FFMPEG_ARGS: &str = "ffmpeg_args";
pub const FFMPEG_PATH: &str = "ffmpeg_path";
pub const LANGUAGE: &str = "language";
pub const LYRICS_FILE: &str = "lyrics_file";
pub const LYRICS_ONLY: &str = "lyrics_only";
pub const OUTPUT_ALBUM: &str = "output_album";
pub const OUTPUT_PLAYLIST_TRACK: &str = "output_playlist_track";
pub const OUTPUT_PLAYLIST_EPISODE: &str = "output_playlist_episode";
pub const OUTPUT_PODCAST: &str = "output_podcast";
pub const PATH_ARCHIVE: &str = "path_archive";
pub const PLAYLIST_LIBRARY: &str = "playlist_library";
pub const PODCAST_LIBRARY: &str = "podcast_library";
pub const PRINT_DOWNLOADS: &str = "print_downloads";
pub const PRINT_ERRORS: &str = "print_errors";
pub const PRINT_PROGRESS: &str = "print_progress";
pub const PRINT_SKIPS: &str = "print_skips";
pub const PRINT_WARNINGS: &str = "print_warnings";
pub const REPLACE_EXISTING: &str = "replace_existing";
pub const SAVE_METADATA: &str = "save_metadata";
pub const SAVE_SUBTITLES: &str = "save_subtitles";
pub const SKIP_DUPLICATES: &str = "skip_duplicates";
pub const SKIP_PREVIOUS: &str = "skip_previous";
pub const TRANSCODE_BITRATE: &str = "transcode_bitrate";

/// Directory name used under the platform config directory.
#[cfg(any(windows, target_os = "macos"))]
const APP_DIR: &str = "Zotify";
#[cfg(not(any(windows, target_os = "macos")))]
const APP_DIR: &str = "zotify";

/// Declared value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Path,
    Str,
    Int,
    Bool,
    AudioFormat,
    Quality,
    ArtworkSize,
}

/// Built-in default of an option.
///
/// Path defaults are stored relative to a platform directory and only turned
/// into absolute paths when requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
    /// Relative to `<config_dir>/zotify`.
    ConfigPath(&'static str),
    /// Relative to the user's home directory.
    HomePath(&'static str),
}

impl DefaultValue {
    /// Serialisable form written to a freshly created settings file.
    pub fn to_json(&self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::from(*s),
            DefaultValue::Int(n) => Value::from(*n),
            DefaultValue::Bool(b) => Value::from(*b),
            DefaultValue::ConfigPath(rel) => {
                Value::from(app_config_dir().join(rel).to_string_lossy().into_owned())
            }
            DefaultValue::HomePath(rel) => {
                Value::from(home_dir().join(rel).to_string_lossy().into_owned())
            }
        }
    }
}

/// Static metadata describing one configurable setting.
#[derive(Debug, Clone, Copy)]
pub struct OptionDescriptor {
    pub key: &'static str,
    pub kind: OptionKind,
    pub default: DefaultValue,
    /// Command-line spellings, long form first.
    pub flags: &'static [&'static str],
    pub help: &'static str,
}

impl OptionDescriptor {
    /// Allowed values for enumerated kinds.
    pub fn choices(&self) -> Option<&'static [&'static str]> {
        match self.kind {
            OptionKind::AudioFormat => Some(&AudioFormat::CHOICES),
            OptionKind::Quality => Some(&Quality::CHOICES),
            OptionKind::ArtworkSize => Some(&ArtworkSize::CHOICES),
            _ => None,
        }
    }

    /// The default, coerced to its typed value.
    pub fn default_value(&self) -> Result<OptionValue> {
        coerce(self, &self.default.to_json())
    }
}

const fn opt(
    key: &'static str,
    kind: OptionKind,
    default: DefaultValue,
    flags: &'static [&'static str],
    help: &'static str,
) -> OptionDescriptor {
    OptionDescriptor {
        key,
        kind,
        default,
        flags,
        help,
    }
}

/// Every option, in resolution order.
#[rustfmt::skip]
pub static OPTIONS: &[OptionDescriptor] = &[
    opt(CREDENTIALS_PATH, OptionKind::Path, DefaultValue::ConfigPath("credentials.json"), &["--credentials"], "Path to credentials file"),
    opt(PATH_ARCHIVE, OptionKind::Path, DefaultValue::ConfigPath("track_archive"), &["--archive"], "Path to track archive file"),
    opt(ALBUM_LIBRARY, OptionKind::Path, DefaultValue::HomePath("Music/Zotify Albums"), &["--album-library"], "Path to root of album library"),
    opt(PODCAST_LIBRARY, OptionKind::Path, DefaultValue::HomePath("Music/Zotify Podcasts"), &["--podcast-library"], "Path to root of podcast library"),
    opt(PLAYLIST_LIBRARY, OptionKind::Path, DefaultValue::HomePath("Music/Zotify Playlists"), &["--playlist-library"], "Path to root of playlist library"),
    opt(OUTPUT_ALBUM, OptionKind::Str, DefaultValue::Str("{album_artist}/{album}/{track_number}. {artists} - {title}"), &["--output-album", "--oa"], "File layout for saved albums"),
    opt(OUTPUT_PLAYLIST_TRACK, OptionKind::Str, DefaultValue::Str("{playlist}/{artists} - {title}"), &["--output-playlist-track", "--opt"], "File layout for tracks in a playlist"),
    opt(OUTPUT_PLAYLIST_EPISODE, OptionKind::Str, DefaultValue::Str("{playlist}/{episode_number} - {title}"), &["--output-playlist-episode", "--ope"], "File layout for episodes in a playlist"),
    opt(OUTPUT_PODCAST, OptionKind::Str, DefaultValue::Str("{podcast}/{episode_number} - {title}"), &["--output-podcast", "--op"], "File layout for saved podcasts"),
    opt(DOWNLOAD_QUALITY, OptionKind::Quality, DefaultValue::Str("auto"), &["--download-quality"], "Audio download quality (auto for highest available)"),
    opt(ARTWORK_SIZE, OptionKind::ArtworkSize, DefaultValue::Str("large"), &["--artwork-size"], "Image size of track's cover art"),
    opt(AUDIO_FORMAT, OptionKind::AudioFormat, DefaultValue::Str("vorbis"), &["--audio-format"], "Audio format of final track output"),
    opt(TRANSCODE_BITRATE, OptionKind::Int, DefaultValue::Int(-1), &["--bitrate"], "Transcoding bitrate (-1 to use download rate)"),
    opt(FFMPEG_PATH, OptionKind::Str, DefaultValue::Str(""), &["--ffmpeg-path"], "Path to ffmpeg binary"),
    opt(FFMPEG_ARGS, OptionKind::Str, DefaultValue::Str(""), &["--ffmpeg-args"], "Additional ffmpeg arguments when transcoding"),
    opt(SAVE_SUBTITLES, OptionKind::Bool, DefaultValue::Bool(false), &["--save-subtitles"], "Save subtitles from podcasts to a .srt file"),
    opt(LANGUAGE, OptionKind::Str, DefaultValue::Str("en"), &["--language"], "Language for metadata"),
    opt(LYRICS_FILE, OptionKind::Bool, DefaultValue::Bool(false), &["--lyrics-file"], "Save lyrics to a file"),
    opt(LYRICS_ONLY, OptionKind::Bool, DefaultValue::Bool(false), &["--lyrics-only"], "Only download lyrics and not actual audio"),
    opt(CREATE_PLAYLIST_FILE, OptionKind::Bool, DefaultValue::Bool(true), &["--playlist-file"], "Save playlist information to an m3u8 file"),
    opt(SAVE_METADATA, OptionKind::Bool, DefaultValue::Bool(true), &["--save-metadata"], "Save metadata, required for other metadata options"),
    opt(ALL_ARTISTS, OptionKind::Bool, DefaultValue::Bool(true), &["--all-artists"], "Add all track artists to artist tag in metadata"),
    opt(REPLACE_EXISTING, OptionKind::Bool, DefaultValue::Bool(false), &["--replace-existing"], "Overwrite existing files with the same name"),
    opt(SKIP_PREVIOUS, OptionKind::Bool, DefaultValue::Bool(true), &["--skip-previous"], "Skip previously downloaded songs"),
    opt(SKIP_DUPLICATES, OptionKind::Bool, DefaultValue::Bool(true), &["--skip-duplicates"], "Skip downloading existing track to different album"),
    opt(PRINT_DOWNLOADS, OptionKind::Bool, DefaultValue::Bool(false), &["--print-downloads"], "Print messages when a song is finished downloading"),
    opt(PRINT_PROGRESS, OptionKind::Bool, DefaultValue::Bool(true), &["--print-progress"], "Show progress bars"),
    opt(PRINT_SKIPS, OptionKind::Bool, DefaultValue::Bool(false), &["--print-skips"], "Show messages if a song is being skipped"),
    opt(PRINT_WARNINGS, OptionKind::Bool, DefaultValue::Bool(true), &["--print-warnings"], "Show warnings"),
    opt(PRINT_ERRORS, OptionKind::Bool, DefaultValue::Bool(true), &["--print-errors"], "Show errors"),
];

/// Looks up a descriptor by key.
pub fn descriptor(key: &str) -> Option<&'static OptionDescriptor> {
    OPTIONS.iter().find(|d| d.key == key)
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Path(PathBuf),
    Str(String),
    Int(i64),
    Bool(bool),
    AudioFormat(AudioFormat),
    Quality(Quality),
    ArtworkSize(ArtworkSize),
}

/// Coerces a raw value into the descriptor's declared type.
///
/// Values already of the target type pass through. Strings become absolute
/// paths for path options and are parsed for enumerated options. Anything
/// else is an [`AppError::InvalidType`].
pub fn coerce(descriptor: &OptionDescriptor, value: &Value) -> Result<OptionValue> {
    let coerced = match (descriptor.kind, value) {
        (OptionKind::Str, Value::String(s)) => OptionValue::Str(s.clone()),
        (OptionKind::Int, Value::Number(n)) if n.is_i64() => {
            OptionValue::Int(n.as_i64().unwrap_or_default())
        }
        (OptionKind::Bool, Value::Bool(b)) => OptionValue::Bool(*b),
        (OptionKind::Path, Value::String(s)) => OptionValue::Path(expand_path(s)?),
        (OptionKind::AudioFormat, Value::String(s)) => {
            OptionValue::AudioFormat(s.parse().map_err(|e| rename_choice(e, descriptor.key))?)
        }
        (OptionKind::Quality, Value::String(s)) => {
            OptionValue::Quality(s.parse().map_err(|e| rename_choice(e, descriptor.key))?)
        }
        (OptionKind::ArtworkSize, Value::String(s)) => {
            OptionValue::ArtworkSize(s.parse().map_err(|e| rename_choice(e, descriptor.key))?)
        }
        (_, other) => {
            return Err(AppError::InvalidType {
                option: descriptor.key.to_string(),
                value: other.to_string(),
            })
        }
    };
    Ok(coerced)
}

// Enumerated parsers report their own option name; the table key wins.
fn rename_choice(err: AppError, key: &str) -> AppError {
    match err {
        AppError::InvalidChoice { value, choices, .. } => AppError::InvalidChoice {
            option: key.to_string(),
            value,
            choices,
        },
        other => other,
    }
}

/// Expands a leading `~` and makes the path absolute against the current
/// directory. The path does not need to exist.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = match raw.strip_prefix('~') {
        Some("") => home_dir(),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => {
            home_dir().join(&rest[1..])
        }
        _ => PathBuf::from(raw),
    };
    Ok(expanded.absolutize()?.into_owned())
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Platform directory holding the settings, credentials and archive files.
pub fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| home_dir().join(".config"))
        .join(APP_DIR)
}
