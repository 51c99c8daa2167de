//! Crawler module for rendering storefronts and discovering product URLs
//!
//! This module contains the core crawling logic, including:
//! - The scroll-convergence loop driving a single page
//! - Per-domain extraction and classification
//! - Bounded retries with exponential backoff
//! - Concurrent orchestration across all configured domains

mod coordinator;
mod domain;
mod retry;
mod scroll;

pub use coordinator::Coordinator;
pub use domain::{DomainCrawler, DomainReport};
pub use retry::{with_retries, RetryPolicy};
pub use scroll::{fetch_with_scrolling, ScrollOutcome, ScrollSettings};

use crate::browser::{BrowserEngine, ChromiumEngine};
use crate::config::Config;
use crate::output::{write_results, CrawlStatistics};
use crate::ScoutError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Summary of a finished crawl run
#[derive(Debug, Clone)]
pub struct CrawlRun {
    /// Where the results were written
    pub output_path: PathBuf,
    pub statistics: CrawlStatistics,
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Launch one headless browser shared by all domains
/// 2. Crawl every domain concurrently
/// 3. Close the browser
/// 4. Write the results to a timestamped JSON file
///
/// # Returns
///
/// * `Ok(CrawlRun)` - Results written
/// * `Err(ScoutError)` - The browser could not start or the output could not be written
pub async fn crawl(config: &Config) -> Result<CrawlRun, ScoutError> {
    let coordinator = Coordinator::new(config)?;
    let started_at = Utc::now();
    let clock = Instant::now();

    let engine = ChromiumEngine::launch(&config.browser).await?;
    run_and_write(&coordinator, config, Arc::new(engine), started_at, clock).await
}

/// Runs a crawl against an already started engine
///
/// Same as [`crawl`] without the browser launch. The engine is closed once
/// every domain has settled.
pub async fn crawl_with_engine(
    config: &Config,
    engine: Arc<dyn BrowserEngine>,
) -> Result<CrawlRun, ScoutError> {
    let coordinator = Coordinator::new(config)?;
    run_and_write(&coordinator, config, engine, Utc::now(), Instant::now()).await
}

async fn run_and_write(
    coordinator: &Coordinator,
    config: &Config,
    engine: Arc<dyn BrowserEngine>,
    started_at: DateTime<Utc>,
    clock: Instant,
) -> Result<CrawlRun, ScoutError> {
    let results = coordinator.run(engine).await;

    let statistics = CrawlStatistics::from_results(&results, clock.elapsed());
    let output_path = write_results(Path::new(&config.output.directory), started_at, &results)?;

    Ok(CrawlRun {
        output_path,
        statistics,
    })
}
