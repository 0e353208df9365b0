//! CLI entry point for the clowds provider tool.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use clowds_core::config::{self, Credentials, Settings};
use clowds_core::providers::extract_video_id;
use clowds_core::{Fetched, Services};
use serde::Serialize;
use tracing::{debug, info};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so stdout stays machine-readable JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    debug!(?args, "CLI arguments parsed");

    let settings = load_settings(&args)?;
    debug!(?settings, "effective settings");

    let credentials = Credentials::from_env();
    let services =
        Services::build(&settings, &credentials).context("Failed to initialize providers")?;

    match args.command {
        Command::Search { query, max_results } => {
            info!(%query, "Searching videos");
            emit(services.youtube.search(&query, max_results).await)?;
        }
        Command::Trending { max_results } => {
            info!("Fetching trending videos");
            emit(services.youtube.trending(max_results).await)?;
        }
        Command::Video { video } => {
            let video_id = extract_video_id(&video).unwrap_or(video);
            info!(%video_id, "Fetching video");
            emit(services.youtube.video_by_id(&video_id).await)?;
        }
        Command::Lyrics { title, artist } => {
            info!(%title, %artist, "Looking up lyrics");
            emit(services.lyrics.lookup(&title, &artist).await)?;
        }
        Command::Match { title, artist } => {
            info!(%title, %artist, "Finding best match");
            let best = services
                .genius
                .find_best_match(&title, &artist)
                .await
                .map(|best| MatchOutput {
                    score: best.score,
                    song: best.candidate,
                });
            emit(Fetched::Live(best))?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct MatchOutput {
    score: f64,
    song: clowds_core::GeniusSong,
}

/// File settings (explicit path or default location) overridden by CLI flags.
fn load_settings(args: &Args) -> Result<Settings> {
    let file = match &args.config {
        Some(path) => Some(
            config::load_file_settings(path)
                .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
        ),
        None => config::load_default_file_settings().context("Failed to load default config file")?,
    };

    let mut settings = file.as_ref().map(Settings::from_file).unwrap_or_default();
    if let Some(secs) = args.cooldown_secs {
        settings = settings.with_cooldown(Duration::from_secs(secs));
    }
    if let Some(max_attempts) = args.max_attempts {
        settings = settings.with_max_attempts(max_attempts);
    }
    Ok(settings)
}

/// Prints the value as JSON on stdout and any fallback notice on stderr.
fn emit<T: Serialize>(fetched: Fetched<T>) -> Result<()> {
    if let Some(message) = fetched.message() {
        eprintln!("Note: {message}");
    }
    let json = serde_json::to_string_pretty(fetched.value()).context("Failed to encode output")?;
    println!("{json}");
    Ok(())
}
