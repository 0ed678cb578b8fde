//! Dredge main entry point
//!
//! This is the command-line interface for the dredge crawl-and-scrape toolkit.

use clap::Parser;
use dredge::config::load_config;
use dredge::crawler::crawl;
use dredge::scrape::{ItemSink, JsonLinesSink, NullSink, ScraperRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Dredge: a concurrent crawl-and-scrape toolkit
///
/// Dredge explores a URL graph from configured seed URLs under depth and
/// count limits, and hands fetched pages to registered per-site scrapers.
/// Without registered scrapers it maps link structure only.
#[derive(Parser, Debug)]
#[command(name = "dredge")]
#[command(version)]
#[command(about = "A concurrent crawl-and-scrape toolkit", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

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
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dredge=info,warn"),
            1 => EnvFilter::new("dredge=debug,info"),
            2 => EnvFilter::new("dredge=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &dredge::Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Dredge Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Same-site only: {}", config.crawler.same_site_only);
    println!("  Max depth: {}", describe_limit_u32(config.crawler.max_depth));
    println!(
        "  Max crawled: {}",
        describe_limit_u64(config.crawler.max_crawled)
    );
    println!(
        "  Max scraped: {}",
        describe_limit_u64(config.crawler.max_scraped)
    );
    println!(
        "  Max time: {}",
        config
            .crawler
            .max_time_secs
            .map_or_else(|| "unbounded".to_string(), |n| format!("{}s", n))
    );

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!(
        "  Retries: {} attempts, {}ms apart, on {:?}",
        config.fetch.retry_count, config.fetch.retry_delay_ms, config.fetch.retry_on
    );
    match &config.fetch.user_agent {
        Some(ua) => println!("  User agent: {}", ua),
        None if config.fetch.randomize_user_agent => println!("  User agent: randomized"),
        None => println!("  User agent: default"),
    }

    println!("\nOutput:");
    match &config.output.items_path {
        Some(path) => println!("  Items: {}", path),
        None => println!("  Items: discarded (no items-path configured)"),
    }

    println!("\nSeed URLs ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    if !config.crawler.include.is_empty() {
        println!("\nInclude patterns ({}):", config.crawler.include.len());
        for pattern in &config.crawler.include {
            println!("  - {}", pattern);
        }
    }

    if !config.crawler.exclude.is_empty() {
        println!("\nExclude patterns ({}):", config.crawler.exclude.len());
        for pattern in &config.crawler.exclude {
            println!("  - {}", pattern);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.crawler.seeds.len()
    );

    Ok(())
}

fn describe_limit_u32(limit: Option<u32>) -> String {
    limit.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
}

fn describe_limit_u64(limit: Option<u64>) -> String {
    limit.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
}

/// Handles the main crawl operation
async fn handle_crawl(config: dredge::Config) -> Result<(), Box<dyn std::error::Error>> {
    let sink: Arc<dyn ItemSink> = match &config.output.items_path {
        Some(path) => {
            tracing::info!("Writing scraped items to {}", path);
            Arc::new(JsonLinesSink::create(Path::new(path))?)
        }
        None => Arc::new(NullSink),
    };

    // Scrapers are registered by binaries built on the library; the stock
    // binary crawls for link structure only.
    let registry = ScraperRegistry::new();

    match crawl(config, registry, sink).await {
        Ok(report) => {
            print!("{}", report.render());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
