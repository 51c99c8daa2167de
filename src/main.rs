//! Product-Scout main entry point
//!
//! This is the command-line interface for the Product-Scout URL discoverer.

use anyhow::Context;
use clap::Parser;
use product_scout::config::{load_config_with_hash, validate, Config};
use product_scout::crawler::crawl;
use product_scout::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Product-Scout: discover product-detail URLs on storefronts
///
/// Product-Scout renders each storefront in headless Chromium, scrolls until
/// lazy-loaded listings stop growing, and records every link shaped like a
/// product page.
#[derive(Parser, Debug)]
#[command(name = "product-scout")]
#[command(version = "1.0.0")]
#[command(about = "Discover product URLs on e-commerce storefronts", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory for result files (overrides the configuration)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration without launching a browser
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
        validate(&config).context("invalid output directory")?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config, cli.quiet).await;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("product_scout=info,warn"),
            1 => EnvFilter::new("product_scout=debug,info"),
            2 => EnvFilter::new("product_scout=trace,debug"),
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

/// Loads the configuration file, or the built-in defaults when none is given
fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using built-in defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e).with_context(|| format!("loading {}", path.display()))
        }
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Product-Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!(
        "  Max scroll attempts: {}",
        config.crawler.max_scroll_attempts
    );
    println!(
        "  Indicator timeout: {}ms",
        config.crawler.indicator_timeout_ms
    );
    println!("  Fallback delay: {}ms", config.crawler.fallback_delay_ms);
    println!("  Indicators: {}", config.crawler.indicator_selector());
    println!(
        "  Attempts per domain: {} (backoff {}ms)",
        config.crawler.max_attempts, config.crawler.retry_backoff_ms
    );

    println!("\nBrowser:");
    println!("  User agent: {}", config.browser.user_agent);
    println!("  Headless: {}", config.browser.headless);
    if let Some(path) = &config.browser.chrome_executable {
        println!("  Executable: {}", path);
    }
    println!("  Args: {}", config.browser.args.join(" "));

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\nDomains ({}):", config.domains.len());
    for domain in &config.domains {
        println!("  - {}", domain);
    }

    println!("\nProduct Patterns ({}):", config.product_patterns.len());
    for pattern in &config.product_patterns {
        println!("  - {}", pattern);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
///
/// Failures are logged rather than returned: a crawl always ends with a
/// normal exit.
async fn handle_crawl(config: &Config, quiet: bool) {
    tracing::info!(
        "Starting crawl of {} domains with {} product patterns",
        config.domains.len(),
        config.product_patterns.len()
    );

    match crawl(config).await {
        Ok(run) => {
            tracing::info!(
                "Crawl completed: {} product URLs across {} domains, written to {}",
                run.statistics.total_product_urls,
                run.statistics.total_domains,
                run.output_path.display()
            );
            if !quiet {
                print_statistics(&run.statistics);
            }
        }
        Err(e) => {
            tracing::error!("Error during crawl: {}", e);
        }
    }
}
