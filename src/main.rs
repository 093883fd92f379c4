//! OWS crawler main entry point
//!
//! This is the command-line interface for the crawler.

use anyhow::Context;
use clap::Parser;
use ows_crawler::config::{load_config_with_hash, Config, CrawlerOptions};
use ows_crawler::crawler::{run_workers, Crawler};
use ows_crawler::frontier::{load_checkpoint, pick_seed, save_checkpoint, Frontier};
use ows_crawler::storage::{open_storage, PagePolicy, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// OWS crawler: a polite web crawler
///
/// Crawls outward from a seed URL while respecting robots.txt rules and
/// crawl delays, storing fetched HTML pages in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "ows-crawler")]
#[command(version)]
#[command(about = "A polite web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of concurrent crawl workers
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Ignore any saved checkpoint and start from a seed URL
    #[arg(long)]
    fresh: bool,

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

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let options = Arc::new(
        CrawlerOptions::from_config(&config.crawler).context("invalid crawler options")?,
    );

    let database_path = Path::new(&config.output.database_path);
    let storage = open_storage(database_path, PagePolicy::from_options(&options))
        .with_context(|| format!("failed to open database {}", database_path.display()))?;
    tracing::info!(
        "Opened database {} ({} pages stored)",
        database_path.display(),
        storage.count_pages().unwrap_or(0)
    );

    let checkpoint_path = PathBuf::from(&config.output.checkpoint_path);
    let frontier = load_frontier(&config, &checkpoint_path, cli.fresh)?;
    let frontier = Arc::new(frontier);

    let crawler = Arc::new(Crawler::new(
        Arc::clone(&options),
        Arc::clone(&frontier),
        Box::new(storage),
    )?);

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut workers = tokio::spawn(run_workers(Arc::clone(&crawler), cli.threads, stop_rx));

    tokio::select! {
        result = &mut workers => {
            result.context("crawl workers panicked")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            tracing::info!("Interrupted, waiting for in-flight pages to finish");
            let _ = stop_tx.send(true);
            workers.await.context("crawl workers panicked")?;
        }
    }

    save_checkpoint(&frontier, &checkpoint_path).context("failed to save checkpoint")?;

    println!("{}", crawler.stats().snapshot());
    Ok(())
}

/// Restores the frontier from the checkpoint, or starts from a random seed
fn load_frontier(config: &Config, checkpoint_path: &Path, fresh: bool) -> anyhow::Result<Frontier> {
    if !fresh {
        let restored = load_checkpoint(checkpoint_path)
            .with_context(|| format!("failed to load checkpoint {}", checkpoint_path.display()))?;
        if let Some(frontier) = restored {
            tracing::info!(
                "Resuming from checkpoint with {} pending URLs across {} domains",
                frontier.len(),
                frontier.domain_count()
            );
            return Ok(frontier);
        }
    }

    let seeds_path = Path::new(&config.output.seeds_path);
    let seed = pick_seed(seeds_path)
        .with_context(|| format!("failed to pick a seed from {}", seeds_path.display()))?;
    tracing::info!("Starting fresh crawl from seed {}", seed);

    Ok(Frontier::new(&seed)?)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` overrides the level picked from the flags.
fn setup_logging(verbose: u8, quiet: bool) {
    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "ows_crawler=info,warn",
            1 => "ows_crawler=debug,info",
            2 => "ows_crawler=trace,debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
