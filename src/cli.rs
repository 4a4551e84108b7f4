//! Command-line surface.
//!
//! One flag is generated per spelling in [`OPTIONS`]; the umbrella flags,
//! `--config` and the orchestration flags are declared by hand.

use crate::error::{AppError, Result};
use crate::options::{OptionKind, OPTIONS};
use crate::settings::Overrides;
use chrono::NaiveTime;
use clap::builder::{BoolishValueParser, PossibleValuesParser};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::ffi::OsString;
use std::path::PathBuf;

const CONFIG: &str = "config";
const LIBRARY: &str = "library";
const OUTPUT: &str = "output";
const PLAYLISTS: &str = "playlists";
const DAILY_AT: &str = "daily_at";
const TOOL: &str = "tool";
const ENV_FILE: &str = "env_file";
const VERBOSE: &str = "verbose";

/// Parsed command line.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
    pub playlists: Option<String>,
    pub daily_at: Option<NaiveTime>,
    pub tool: Option<String>,
    pub env_file: Option<PathBuf>,
    pub verbose: bool,
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Result<Self> {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list.
    pub fn parse_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command()
            .try_get_matches_from(args)
            .map_err(|e| AppError::Custom(e.to_string()))?;
        Self::from_matches(&matches)
    }

    /// True when the run should be driven by resolved settings rather than
    /// the environment.
    pub fn uses_settings(&self) -> bool {
        self.config.is_some() || !self.overrides.is_empty()
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut overrides = Overrides::default();
        for descriptor in OPTIONS {
            let value = match descriptor.kind {
                OptionKind::Bool => matches.get_one::<bool>(descriptor.key).map(|b| Value::from(*b)),
                OptionKind::Int => matches.get_one::<i64>(descriptor.key).map(|n| Value::from(*n)),
                _ => matches
                    .get_one::<String>(descriptor.key)
                    .map(|s| Value::from(s.as_str())),
            };
            if let Some(value) = value {
                overrides.set(descriptor.key, value);
            }
        }
        overrides.library = matches
            .get_one::<String>(LIBRARY)
            .filter(|s| !s.is_empty())
            .cloned();
        overrides.output = matches
            .get_one::<String>(OUTPUT)
            .filter(|s| !s.is_empty())
            .cloned();

        let daily_at = matches
            .get_one::<String>(DAILY_AT)
            .map(|raw| parse_time(raw))
            .transpose()?;

        Ok(Self {
            config: matches.get_one::<PathBuf>(CONFIG).cloned(),
            overrides,
            playlists: matches.get_one::<String>(PLAYLISTS).cloned(),
            daily_at,
            tool: matches.get_one::<String>(TOOL).cloned(),
            env_file: matches.get_one::<PathBuf>(ENV_FILE).cloned(),
            verbose: matches.get_flag(VERBOSE),
        })
    }
}

/// Parses a `HH:MM` (or `HH:MM:SS`) wall-clock time.
pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
        .map_err(|_| AppError::Custom(format!("Invalid time '{raw}', expected HH:MM")))
}

/// Builds the clap command from the option table.
pub fn command() -> Command {
    let mut cmd = Command::new("playlist-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Downloads configured playlists and regenerates their .m3u index files")
        .arg(
            Arg::new(CONFIG)
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("JSON settings file (created with defaults if missing)"),
        )
        .arg(
            Arg::new(LIBRARY)
                .long("library")
                .value_name("PATH")
                .help("Root for album, playlist and podcast libraries"),
        )
        .arg(
            Arg::new(OUTPUT)
                .long("output")
                .value_name("PATTERN")
                .help("File layout for every kind of download"),
        )
        .arg(
            Arg::new(PLAYLISTS)
                .long("playlists")
                .value_name("LIST")
                .help("Playlist URLs separated by \", \" (defaults to $PLAYLISTS)"),
        )
        .arg(
            Arg::new(DAILY_AT)
                .long("daily-at")
                .value_name("HH:MM")
                .help("Keep running and repeat the sync every day at this local time"),
        )
        .arg(
            Arg::new(TOOL)
                .long("tool")
                .value_name("BIN")
                .help("Download tool to invoke (defaults to $ZOTIFY_BIN or zotify)"),
        )
        .arg(
            Arg::new(ENV_FILE)
                .long("env-file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Load environment variables from this file instead of .env"),
        )
        .arg(
            Arg::new(VERBOSE)
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        );

    for descriptor in OPTIONS {
        let (long, aliases) = match descriptor.flags.split_first() {
            Some((first, rest)) => (*first, rest),
            None => continue,
        };

        let mut arg = Arg::new(descriptor.key)
            .long(long.trim_start_matches('-'))
            .help(descriptor.help)
            .action(ArgAction::Set);
        for &alias in aliases {
            arg = arg.visible_alias(alias.trim_start_matches('-'));
        }

        arg = match descriptor.kind {
            OptionKind::Bool => arg
                .value_name("BOOL")
                .value_parser(BoolishValueParser::new()),
            OptionKind::Int => arg
                .value_name("N")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64)),
            OptionKind::Path => arg.value_name("PATH"),
            OptionKind::Str => arg.value_name("VALUE"),
            OptionKind::AudioFormat | OptionKind::Quality | OptionKind::ArtworkSize => {
                let choices = descriptor.choices().unwrap_or_default();
                arg.value_name("CHOICE")
                    .value_parser(PossibleValuesParser::new(choices.iter().copied()))
            }
        };

        cmd = cmd.arg(arg);
    }

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::*;
    use serde_json::json;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn no_flags_means_environment_mode() {
        let args = CliArgs::parse_from(["playlist-sync"]).unwrap();
        assert!(!args.uses_settings());
        assert!(args.daily_at.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn typed_flags_become_overrides() {
        let args = CliArgs::parse_from([
            "playlist-sync",
            "--bitrate",
            "-1",
            "--lyrics-file",
            "yes",
            "--audio-format",
            "mp3",
            "--oa",
            "{album}/{title}",
        ])
        .unwrap();

        let values = &args.overrides.values;
        assert_eq!(values[TRANSCODE_BITRATE], json!(-1));
        assert_eq!(values[LYRICS_FILE], json!(true));
        assert_eq!(values[AUDIO_FORMAT], json!("mp3"));
        assert_eq!(values[OUTPUT_ALBUM], json!("{album}/{title}"));
        assert!(!values.contains_key(LANGUAGE));
        assert!(args.uses_settings());
    }

    #[test]
    fn rejects_values_outside_choices() {
        assert!(CliArgs::parse_from(["playlist-sync", "--download-quality", "best"]).is_err());
    }

    #[test]
    fn umbrellas_and_orchestration_flags() {
        let args = CliArgs::parse_from([
            "playlist-sync",
            "--config",
            "/tmp/zotify.json",
            "--library",
            "~/Music",
            "--output",
            "{title}",
            "--playlists",
            "https://a, https://b",
            "--daily-at",
            "03:30",
            "--tool",
            "/usr/local/bin/zotify",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("/tmp/zotify.json")));
        assert_eq!(args.overrides.library.as_deref(), Some("~/Music"));
        assert_eq!(args.overrides.output.as_deref(), Some("{title}"));
        assert_eq!(args.playlists.as_deref(), Some("https://a, https://b"));
        assert_eq!(args.daily_at, NaiveTime::from_hms_opt(3, 30, 0));
        assert_eq!(args.tool.as_deref(), Some("/usr/local/bin/zotify"));
    }

    #[test]
    fn empty_umbrellas_are_ignored() {
        let args = CliArgs::parse_from(["playlist-sync", "--library", "", "--output", ""]).unwrap();
        assert!(args.overrides.library.is_none());
        assert!(args.overrides.output.is_none());
        assert!(!args.uses_settings());
    }

    #[test]
    fn invalid_daily_time_is_rejected() {
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("noon").is_err());
        assert_eq!(parse_time(" 07:05 ").unwrap(), NaiveTime::from_hms_opt(7, 5, 0).unwrap());
    }
}
