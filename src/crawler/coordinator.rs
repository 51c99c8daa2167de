//! Crawler coordinator - concurrent crawl orchestration
//!
//! One task per domain runs against a single shared browser. All tasks are
//! started together and the coordinator waits for every one of them to settle.
//! A domain that errors or panics keeps an empty entry; it never aborts its
//! siblings or the run.

use crate::browser::BrowserEngine;
use crate::config::Config;
use crate::crawler::domain::DomainCrawler;
use crate::crawler::retry::{with_retries, RetryPolicy};
use crate::output::CrawlResult;
use crate::ScoutError;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Main crawler coordinator structure
pub struct Coordinator {
    domains: Vec<String>,
    crawler: Arc<DomainCrawler>,
    retry: RetryPolicy,
}

impl Coordinator {
    /// Creates a coordinator for the configured domains
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScoutError)` - A product pattern failed to compile
    pub fn new(config: &Config) -> Result<Self, ScoutError> {
        let crawler = DomainCrawler::from_config(config)?;
        let retry = RetryPolicy::new(config.crawler.max_attempts, config.crawler.retry_backoff());

        Ok(Self::with_crawler(config.domains.clone(), crawler, retry))
    }

    pub fn with_crawler(domains: Vec<String>, crawler: DomainCrawler, retry: RetryPolicy) -> Self {
        Self {
            domains,
            crawler: Arc::new(crawler),
            retry,
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Crawls every domain concurrently and closes the engine afterwards
    ///
    /// The returned map has exactly one entry per configured domain.
    pub async fn run(&self, engine: Arc<dyn BrowserEngine>) -> CrawlResult {
        let mut results: CrawlResult = self
            .domains
            .iter()
            .map(|domain| (domain.clone(), Vec::new()))
            .collect();

        let mut tasks = JoinSet::new();

        for domain in &self.domains {
            let domain = domain.clone();
            let engine = Arc::clone(&engine);
            let crawler = Arc::clone(&self.crawler);
            let retry = self.retry;

            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(with_retries(&retry, &domain, |_| {
                    crawler.crawl(engine.as_ref(), &domain)
                }))
                .catch_unwind()
                .await;
                (domain, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((domain, Ok(Ok(report)))) => {
                    info!(
                        "Found {} product URLs on {} ({}, {} scroll attempts)",
                        report.product_urls.len(),
                        domain,
                        report.phase,
                        report.scroll_attempts
                    );
                    results.insert(domain, report.product_urls);
                }
                Ok((domain, Ok(Err(e)))) => {
                    error!("Error crawling {}: {}", domain, e);
                }
                Ok((domain, Err(payload))) => {
                    error!("Crawl of {} panicked: {}", domain, panic_message(payload.as_ref()));
                }
                Err(e) => {
                    error!("Crawl task did not complete: {}", e);
                }
            }
        }

        if let Err(e) = engine.close().await {
            error!("Failed to close browser: {}", e);
        }

        results
    }
}

/// Best-effort text of a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
