//! Closed value sets for the enumerated options.
//!
//! Each type parses from its canonical lowercase spelling and fails with
//! [`AppError::InvalidChoice`] on anything else.

use crate::error::{AppError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

fn invalid_choice(option: &str, value: &str, choices: &[&str]) -> AppError {
    AppError::InvalidChoice {
        option: option.to_string(),
        value: value.to_string(),
        choices: choices.iter().map(|c| c.to_string()).collect(),
    }
}

/// Audio format of the final track output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    Aac,
    FdkAac,
    Flac,
    Mp3,
    Opus,
    Vorbis,
    Wav,
    Wv,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 8] = [
        AudioFormat::Aac,
        AudioFormat::FdkAac,
        AudioFormat::Flac,
        AudioFormat::Mp3,
        AudioFormat::Opus,
        AudioFormat::Vorbis,
        AudioFormat::Wav,
        AudioFormat::Wv,
    ];

    pub const CHOICES: [&'static str; 8] =
        ["aac", "fdk_aac", "flac", "mp3", "opus", "vorbis", "wav", "wv"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Aac => "aac",
            AudioFormat::FdkAac => "fdk_aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus => "opus",
            AudioFormat::Vorbis => "vorbis",
            AudioFormat::Wav => "wav",
            AudioFormat::Wv => "wv",
        }
    }

    /// File extension written by the download tool for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Aac | AudioFormat::FdkAac => "m4a",
            AudioFormat::Flac => "flac",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus | AudioFormat::Vorbis => "ogg",
            AudioFormat::Wav => "wav",
            AudioFormat::Wv => "wv",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| invalid_choice("audio_format", s, &Self::CHOICES))
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio download quality. `Auto` picks the highest the account allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Auto,
    Normal,
    High,
    VeryHigh,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Auto, Quality::Normal, Quality::High, Quality::VeryHigh];

    pub const CHOICES: [&'static str; 4] = ["auto", "normal", "high", "very_high"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Auto => "auto",
            Quality::Normal => "normal",
            Quality::High => "high",
            Quality::VeryHigh => "very_high",
        }
    }
}

impl FromStr for Quality {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|quality| quality.as_str() == wanted)
            .ok_or_else(|| invalid_choice("download_quality", s, &Self::CHOICES))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image size of a track's cover art.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtworkSize {
    Small,
    Medium,
    Large,
}

impl ArtworkSize {
    pub const ALL: [ArtworkSize; 3] = [ArtworkSize::Small, ArtworkSize::Medium, ArtworkSize::Large];

    pub const CHOICES: [&'static str; 3] = ["small", "medium", "large"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtworkSize::Small => "small",
            ArtworkSize::Medium => "medium",
            ArtworkSize::Large => "large",
        }
    }
}

impl FromStr for ArtworkSize {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == wanted)
            .ok_or_else(|| invalid_choice("artwork_size", s, &Self::CHOICES))
    }
}

impl fmt::Display for ArtworkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_mixed_case_spellings() {
        assert_eq!("vorbis".parse::<AudioFormat>().unwrap(), AudioFormat::Vorbis);
        assert_eq!(" FDK_AAC ".parse::<AudioFormat>().unwrap(), AudioFormat::FdkAac);
        assert_eq!("Very_High".parse::<Quality>().unwrap(), Quality::VeryHigh);
        assert_eq!("large".parse::<ArtworkSize>().unwrap(), ArtworkSize::Large);
    }

    #[test]
    fn unknown_value_names_option_and_choices() {
        let err = "ogg".parse::<AudioFormat>().unwrap_err();
        match err {
            AppError::InvalidChoice { option, value, choices } => {
                assert_eq!(option, "audio_format");
                assert_eq!(value, "ogg");
                assert!(choices.contains(&"mp3".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!("ultra".parse::<Quality>().is_err());
        assert!("huge".parse::<ArtworkSize>().is_err());
    }

    #[test]
    fn display_matches_choices() {
        for (format, choice) in AudioFormat::ALL.iter().zip(AudioFormat::CHOICES) {
            assert_eq!(format.to_string(), choice);
        }
        assert_eq!(Quality::VeryHigh.to_string(), "very_high");
        assert_eq!(serde_json::to_string(&Quality::VeryHigh).unwrap(), "\"very_high\"");
    }

    #[test]
    fn lossy_codecs_share_container_extensions() {
        assert_eq!(AudioFormat::Vorbis.extension(), "ogg");
        assert_eq!(AudioFormat::Opus.extension(), "ogg");
        assert_eq!(AudioFormat::FdkAac.extension(), "m4a");
    }
}
