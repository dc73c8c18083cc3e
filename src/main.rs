mod changelog;
mod config;
mod error;
mod gist_rs;
mod logging;
mod ports;
mod services;
mod youtube_rs;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::{Result, eyre::WrapErr};

use crate::{
    changelog::{EntryOrder, RenderOptions},
    config::{Config, Credentials},
    logging::setup_logging,
    ports::document_store::DocumentUpdate,
    services::{
        http::HttpOptions,
        sync::{PlaylistOutcome, SyncOptions, SyncReport, run_sync},
    },
};

/// Record additions and removals of YouTube playlists as changelog documents in a gist.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YouTube Data API key
    #[arg(long = "api-key", env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Gist that stores one snapshot document per playlist
    #[arg(long = "gist-id", env = "GIST_ID")]
    gist_id: String,

    /// GitHub token allowed to edit the gist
    #[arg(long = "token", env = "PAT", hide_env_values = true)]
    token: String,

    /// Playlist list (JSON array, or `[[playlist]]` tables in a .toml file)
    #[arg(short, long, env = "PLAYLISTS_FILE")]
    playlists: Option<PathBuf>,

    /// Order of entries in the written documents
    #[arg(long, value_enum, default_value_t = EntryOrder::Reconciled)]
    sort: EntryOrder,

    /// Compute the new documents without updating the gist
    #[arg(long)]
    dry_run: bool,

    /// Print every prepared document
    #[arg(long)]
    print: bool,

    /// Delete stored documents that no tracked playlist maps to
    #[arg(long)]
    prune: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Retries for transient network failures
    #[arg(long, default_value = "3")]
    max_retries: usize,

    /// Console log level (default: info)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug")]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "PLAYLIST_CHANGELOG_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Playlist changelog starting");

    let credentials = Credentials {
        api_key: args.api_key,
        store_id: args.gist_id,
        access_token: args.token,
    };
    credentials
        .validate()
        .wrap_err("Missing credentials")?;

    let config = {
        if let Some(path) = &args.playlists {
            Config::from_file(path)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load playlist config")?;
    log::debug!("Tracking {} playlists", config.playlists.len());

    let options = SyncOptions {
        render: RenderOptions { order: args.sort },
        dry_run: args.dry_run,
        prune: args.prune,
    };
    let http = HttpOptions {
        timeout: Duration::from_secs(args.timeout_secs),
        max_retries: args.max_retries,
    };

    let report = run_sync(&credentials, &config.playlists, &options, http)
        .await
        .wrap_err("Playlist sync failed")?;

    if args.print {
        print_documents(&report);
    }
    log_summary(&report);

    Ok(())
}

fn print_documents(report: &SyncReport) {
    for (filename, update) in &report.updates {
        match update {
            DocumentUpdate::Write(content) => println!("{} :\n{}", filename, content),
            DocumentUpdate::Delete => println!("{} : (deleted)\n", filename),
        }
    }
}

fn log_summary(report: &SyncReport) {
    for playlist in &report.playlists {
        match &playlist.outcome {
            PlaylistOutcome::Prepared {
                filename,
                counts,
                lines,
                prior_discarded,
            } => log::info!(
                "{} -> {} ({} lines): {} kept, {} added, {} removed{}",
                playlist.name,
                filename,
                lines,
                counts.kept,
                counts.added,
                counts.removed,
                if *prior_discarded {
                    " (previous snapshot discarded)"
                } else {
                    ""
                }
            ),
            PlaylistOutcome::Skipped { reason } => {
                log::warn!("{} skipped: {}", playlist.name, reason)
            }
        }
    }

    let skipped = report.skipped().count();
    if skipped > 0 {
        log::warn!("{} of {} playlists skipped", skipped, report.playlists.len());
    }

    if report.written {
        log::info!("Gist successfully updated with all playlists");
    } else if !report.updates.is_empty() {
        log::info!("Gist left unchanged ({} files prepared)", report.updates.len());
    }
}
