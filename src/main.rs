//! vlist-crawler main entry point
//!
//! This is the command-line interface for the vlist-crawler catalogue exporter.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use vlist_crawler::config::{load_config_with_hash, Config};
use vlist_crawler::credentials::parse_credentials;
use vlist_crawler::crawler::{crawl, LogProgress};
use vlist_crawler::output::write_outputs;

/// vlist-crawler: export every video of a creator
///
/// Walks the creator's video list page by page using the session cookies of
/// a logged-in browser, then writes the titles, play counts and durations
/// as CSV and JSON.
#[derive(Parser, Debug)]
#[command(name = "vlist-crawler")]
#[command(version)]
#[command(about = "Export a creator's complete video list", long_about = None)]
struct Cli {
    /// Creator id (mid)
    #[arg(value_name = "MID")]
    mid: String,

    /// Cookie string copied from the browser (must contain SESSDATA, bili_jct and buvid3)
    #[arg(long, conflicts_with = "cookie_file", required_unless_present = "cookie_file")]
    cookie: Option<String>,

    /// Read the cookie string from a file
    #[arg(long, value_name = "PATH")]
    cookie_file: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the output directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Crawl and print the summary without writing any files
    #[arg(long)]
    no_save: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };
    if let Some(dir) = cli.output_dir {
        config.output.directory = dir;
    }

    let raw_cookie = match (&cli.cookie, &cli.cookie_file) {
        (Some(cookie), _) => cookie.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cookie file {}", path.display()))?,
        (None, None) => bail!("a cookie is required (--cookie or --cookie-file)"),
    };
    let credentials = parse_credentials(&raw_cookie).context("invalid cookie")?;
    tracing::debug!(
        "Using cookies: {}",
        credentials.names().collect::<Vec<_>>().join(", ")
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping before the next page");
                cancel.cancel();
            }
        }
    });

    let outcome = match crawl(&config, &cli.mid, &credentials, &LogProgress, cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    println!("{}", outcome.summary());

    if cli.no_save {
        return Ok(());
    }

    let paths = write_outputs(
        &outcome.aggregate,
        &outcome.creator_id,
        &config.output,
        &chrono::Local::now(),
    )
    .context("failed to write output files")?;

    println!("Data saved to:");
    if let Some(path) = &paths.csv {
        println!("  CSV: {}", path.display());
    }
    if let Some(path) = &paths.json {
        println!("  JSON: {}", path.display());
    }
    if let Some(path) = &paths.raw_json {
        println!("  Raw data: {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vlist_crawler=info,warn"),
            1 => EnvFilter::new("vlist_crawler=debug,info"),
            2 => EnvFilter::new("vlist_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
