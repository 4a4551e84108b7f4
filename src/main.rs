use playlist_sync::cli::CliArgs;
use playlist_sync::config::{split_playlists, PLAYLISTS};
use playlist_sync::error::Result;
use playlist_sync::schedule::run_daily;
use playlist_sync::{Config, Downloader, Settings};
use tracing::{error, info, warn, Level};

/// Main entry point for the application.
///
/// # Steps
/// 1. Parses the command line and loads `.env`
/// 2. Initializes logging
/// 3. Builds the run configuration from the environment or from settings
/// 4. Runs the sync once, or daily when a trigger time is configured
///
/// # Errors
/// Exits with status 1 if the configuration is invalid or the index files
/// cannot be written.
#[tokio::main]
async fn main() {
    let args = match CliArgs::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let dotenv = match &args.env_file {
        Some(path) => dotenvy::from_path(path).map(|_| ()),
        None => dotenvy::dotenv().map(|_| ()),
    };
    if let Err(e) = dotenv {
        if args.env_file.is_some() {
            warn!("Could not load environment file: {}", e);
        }
    }

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;
    config.log_summary();
    if let Err(e) = config.check_credentials() {
        warn!("{}", e);
    }

    let daily_at = config.daily_at;
    let downloader = Downloader::new(config);

    match daily_at {
        Some(at) => run_daily(&downloader, at).await,
        None => {
            info!("Starting the sync");
            downloader.run_once().await?;
            info!("Sync completed");
        }
    }
    Ok(())
}

/// Builds the run configuration.
///
/// Without `--config` or option flags the environment drives the run;
/// otherwise the resolved settings do, with playlists taken from
/// `--playlists` or `$PLAYLISTS`. `$ZOTIFY_BIN` and `$SCHEDULE_TIME` apply
/// in both modes.
fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = if args.uses_settings() {
        let settings = Settings::resolve(args.config.as_deref(), &args.overrides)?;
        let playlists = args
            .playlists
            .clone()
            .or_else(|| std::env::var(PLAYLISTS).ok())
            .unwrap_or_default();
        let mut config = Config::from_settings(&settings, &playlists);
        config.apply_optional_env(|key| std::env::var(key).ok())?;
        config
    } else {
        let mut config = Config::from_env()?;
        if let Some(playlists) = &args.playlists {
            config.playlists = split_playlists(playlists);
        }
        config
    };

    if let Some(tool) = &args.tool {
        config.tool = tool.clone();
    }
    if args.daily_at.is_some() {
        config.daily_at = args.daily_at;
    }
    Ok(config)
}
