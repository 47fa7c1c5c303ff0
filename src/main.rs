//! Catalog-Mirror main entry point
//!
//! This is the command-line interface for the Catalog-Mirror feed synchronizer.

use anyhow::Context;
use catalog_mirror::config::{load_config_with_hash, Config};
use catalog_mirror::crawler::{build_context, CrawlWorker, Orchestrator};
use catalog_mirror::output::{
    format_site_report, load_statistics, print_run_summary, print_statistics,
};
use catalog_mirror::storage::{open_storage, CatalogStore, SqliteConnector, SqliteStorage};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Catalog-Mirror: per-site XML product feed synchronizer
///
/// Pulls each registered site's catalog feed, mirrors product images to
/// local disk and keeps the SQLite catalog current. Products already stored
/// for a site are skipped.
#[derive(Parser, Debug)]
#[command(name = "catalog-mirror")]
#[command(version = "1.0.0")]
#[command(about = "Per-site XML product feed synchronizer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Crawl only this site instead of every registered one
    #[arg(long, value_name = "NAME", conflicts_with_all = ["stats", "list_sites"])]
    site: Option<String>,

    /// Override the image mirror root from the config
    #[arg(long, value_name = "DIR")]
    base_path: Option<String>,

    /// Override the number of sites crawled at once
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=64))]
    pool_size: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "list_sites")]
    stats: bool,

    /// List registered sites and exit
    #[arg(long, conflicts_with = "stats")]
    list_sites: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config).with_context(|| {
        format!("Failed to load configuration from {}", cli.config.display())
    })?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.stats {
        handle_stats(&config)
    } else if cli.list_sites {
        handle_list_sites(&config)
    } else {
        let base_path = cli
            .base_path
            .unwrap_or_else(|| config.images.base_path.clone());
        let pool_size = cli.pool_size.unwrap_or(config.crawler.pool_size);

        let cancel = CancellationToken::new();
        spawn_interrupt_handler(cancel.clone());

        match cli.site {
            Some(site) => handle_site(&config, site, base_path, cancel).await,
            None => handle_crawl(config, base_path, pool_size as usize, cancel).await,
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_mirror=info,warn"),
            1 => EnvFilter::new("catalog_mirror=debug,info"),
            2 => EnvFilter::new("catalog_mirror=trace,debug"),
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

/// Cancels the run on the first Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, stopping after in-flight requests");
                cancel.cancel();
            }
            Err(e) => tracing::error!("Cannot listen for interrupts: {}", e),
        }
    });
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    let storage = open_storage(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    Ok(storage.with_operator(config.storage.operator.clone()))
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --list-sites mode
fn handle_list_sites(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let sites = storage.list_sites()?;

    println!("Registered sites ({}):", sites.len());
    for site in &sites {
        match site.niche_id {
            Some(niche) => println!("  - {} (niche {})", site.name, niche),
            None => println!("  - {}", site.name),
        }
    }

    Ok(())
}

/// Handles --site: one worker, in this process
async fn handle_site(
    config: &Config,
    site: String,
    base_path: String,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let context = build_context(config)?;
    let storage = open_database(config)?;

    tracing::info!("Crawling site {} into {}", site, base_path);
    let report = CrawlWorker::new(site, context, storage, base_path, cancel)
        .run()
        .await?;

    println!("{}", format_site_report(&report));
    if let Some(error) = report.error {
        anyhow::bail!("Site {} failed: {}", report.site, error);
    }
    Ok(())
}

/// Handles the main crawl operation over every registered site
async fn handle_crawl(
    config: Config,
    base_path: String,
    pool_size: usize,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let context = build_context(&config)?;
    let connector = SqliteConnector::new(
        &config.storage.database_path,
        config.storage.operator.clone(),
    );

    tracing::info!(
        "Starting crawl with {} concurrent sites, images under {}",
        pool_size,
        base_path
    );
    let orchestrator = Orchestrator::new(connector, context, cancel);

    match orchestrator.run_all(&base_path, pool_size).await {
        Ok(summary) => {
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
