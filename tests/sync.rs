use playlist_sync::cli::CliArgs;
use playlist_sync::options::{OptionValue, AUDIO_FORMAT, LANGUAGE, TRANSCODE_BITRATE};
use playlist_sync::{AudioFormat, Config, Downloader, Regenerator, Settings};
use std::fs;
use tempfile::tempdir;

#[test]
fn command_line_beats_file_beats_default() {
    let dir = tempdir().unwrap();
    let config_file = dir.path().join("config.json");
    fs::write(
        &config_file,
        r#"{"audio_format": "mp3", "language": "sv", "transcode_bitrate": 96}"#,
    )
    .unwrap();

    let args = CliArgs::parse_from([
        "playlist-sync".to_string(),
        "--config".to_string(),
        config_file.to_string_lossy().into_owned(),
        "--audio-format".to_string(),
        "flac".to_string(),
    ])
    .unwrap();
    assert!(args.uses_settings());

    let settings = Settings::resolve(args.config.as_deref(), &args.overrides).unwrap();
    assert_eq!(settings.get(AUDIO_FORMAT), Some(OptionValue::AudioFormat(AudioFormat::Flac)));
    assert_eq!(settings.get(LANGUAGE), Some(OptionValue::Str("sv".to_string())));
    assert_eq!(settings.get(TRANSCODE_BITRATE), Some(OptionValue::Int(96)));
    assert!(!settings.replace_existing);
}

#[test]
fn library_flag_drives_the_sync_root() {
    let dir = tempdir().unwrap();
    let library = dir.path().join("library");

    let args = CliArgs::parse_from([
        "playlist-sync".to_string(),
        "--playlist-library".to_string(),
        "/elsewhere".to_string(),
        "--library".to_string(),
        library.to_string_lossy().into_owned(),
    ])
    .unwrap();

    let settings = Settings::resolve(args.config.as_deref(), &args.overrides).unwrap();
    let config = Config::from_settings(&settings, "spotify:playlist:one, spotify:playlist:two");
    assert_eq!(config.root_path, library);
    assert_eq!(settings.album_library, library);
    assert_eq!(settings.podcast_library, library);
    assert_eq!(config.playlists, ["spotify:playlist:one", "spotify:playlist:two"]);
}

#[cfg(unix)]
#[tokio::test]
async fn full_run_downloads_then_regenerates() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("music");
    fs::create_dir_all(root.join("Chill")).unwrap();
    fs::write(root.join("Chill").join("song.mp3"), b"").unwrap();

    let config = Config {
        tool: "true".to_string(),
        credentials_path: dir.path().join("credentials.json"),
        archive_path: dir.path().join("archive"),
        root_path: root.clone(),
        audio_format: AudioFormat::Mp3,
        quality: playlist_sync::Quality::Auto,
        playlists: vec!["spotify:playlist:chill".to_string()],
        daily_at: None,
    };
    assert!(config.check_credentials().is_err());

    let downloader = Downloader::new(config).with_regenerator(Regenerator::new(["mp3"]));
    let progress = downloader.run_once().await.unwrap();

    assert_eq!(progress.completed, 1);
    assert_eq!(progress.errors, 0);
    assert_eq!(
        fs::read_to_string(root.join("Chill").join("Chill.m3u")).unwrap(),
        "song.mp3\n"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn failed_downloads_still_regenerate() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("music");
    fs::create_dir_all(root.join("Empty")).unwrap();

    let config = Config {
        tool: "false".to_string(),
        credentials_path: dir.path().join("credentials.json"),
        archive_path: dir.path().join("archive"),
        root_path: root.clone(),
        audio_format: AudioFormat::Vorbis,
        quality: playlist_sync::Quality::High,
        playlists: vec![
            "spotify:playlist:one".to_string(),
            "spotify:playlist:two".to_string(),
        ],
        daily_at: None,
    };

    let progress = Downloader::new(config).run_once().await.unwrap();
    assert_eq!(progress.completed, 2);
    assert_eq!(progress.errors, 2);
    assert_eq!(fs::read_to_string(root.join("Empty").join("Empty.m3u")).unwrap(), "");
}
