//! Sitemap-Sieve main entry point
//!
//! This is the command-line interface for the Sitemap-Sieve harvester.

use clap::Parser;
use std::path::PathBuf;
use sitemap_sieve::config::{load_config, load_config_with_hash, Config};
use sitemap_sieve::crawler::{run_crawl, CrawlMode, CrawlOutcome};
use tracing_subscriber::EnvFilter;

/// Sitemap-Sieve: a two-level sitemap harvester
///
/// Sitemap-Sieve reads a root sitemap, follows the archive sitemaps it
/// lists, and writes the article URLs matching the configured filters to
/// CSV files, one batch per stage.
#[derive(Parser, Debug)]
#[command(name = "sitemap-sieve")]
#[command(version = "1.0.0")]
#[command(about = "A two-level sitemap harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (environment keys override it)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Skip discovery and read archive URLs from this file in the input directory
    #[arg(long, value_name = "FILE")]
    seed_file: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let loaded = match &cli.config {
        Some(path) => load_config_with_hash(path).map(|(config, hash)| {
            tracing::info!(
                "Configuration loaded from {} (hash: {})",
                path.display(),
                hash
            );
            config
        }),
        None => load_config(None),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let mode = match cli.seed_file {
        Some(file_name) => CrawlMode::Seeded { file_name },
        None => CrawlMode::Discover,
    };

    if cli.dry_run {
        handle_dry_run(&config, &mode);
        return Ok(());
    }

    handle_crawl(&config, &mode).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_sieve=info,warn"),
            1 => EnvFilter::new("sitemap_sieve=debug,info"),
            2 => EnvFilter::new("sitemap_sieve=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, mode: &CrawlMode) {
    println!("=== Sitemap-Sieve Dry Run ===\n");

    println!("Sitemap:");
    match mode {
        CrawlMode::Discover => println!(
            "  Root URL: {}",
            config.sitemap.root_url.as_deref().unwrap_or("(unset)")
        ),
        CrawlMode::Seeded { file_name } => println!(
            "  Seed file: {}/{}",
            config.output.input_directory, file_name
        ),
    }
    println!("  Archive filter: {:?}", config.sitemap.match_content);
    println!("  Article filter: {:?}", config.sitemap.match_url);

    println!("\nFetcher:");
    println!("  Backend: {:?}", config.fetcher.backend);
    println!("  Settle delay: {}ms", config.fetcher.settle_delay);
    match config.fetcher.navigation_timeout() {
        Some(timeout) => println!("  Navigation timeout: {}ms", timeout.as_millis()),
        None => println!("  Navigation timeout: none"),
    }
    println!("  Selector timeout: {}ms", config.fetcher.selector_timeout);
    for (name, value) in &config.fetcher.headers {
        println!("  Header: {}: {}", name, value);
    }

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Raw capture: {}", config.output.capture_raw);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, mode: &CrawlMode) -> Result<(), Box<dyn std::error::Error>> {
    match run_crawl(config, mode).await {
        Ok(CrawlOutcome::EmptySeed) => {
            tracing::error!("Crawl aborted: {}", CrawlOutcome::EmptySeed);
            std::process::exit(1);
        }
        Ok(outcome) => {
            tracing::info!("Crawl finished: {}", outcome);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
