//! Per-domain crawl: render, scroll, extract, classify

use crate::browser::BrowserEngine;
use crate::config::Config;
use crate::crawler::scroll::{fetch_with_scrolling, ScrollSettings};
use crate::state::CrawlPhase;
use crate::url::{classify, extract_urls, ProductPatterns};
use crate::ScoutError;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything learned about one domain
#[derive(Debug, Clone)]
pub struct DomainReport {
    pub domain: String,
    /// Deduplicated product URLs
    pub product_urls: Vec<String>,
    /// Absolute URLs found in the markup before classification
    pub links_found: usize,
    pub phase: CrawlPhase,
    pub scroll_attempts: u32,
}

/// Drives one page per domain through the scroll loop and classifies its links
#[derive(Debug, Clone)]
pub struct DomainCrawler {
    settings: ScrollSettings,
    patterns: Arc<ProductPatterns>,
}

impl DomainCrawler {
    pub fn new(settings: ScrollSettings, patterns: Arc<ProductPatterns>) -> Self {
        Self { settings, patterns }
    }

    /// Builds a crawler from configuration, compiling the product patterns
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let patterns = ProductPatterns::new(&config.product_patterns)?;
        let settings = ScrollSettings::from_config(&config.crawler, &config.browser);
        Ok(Self::new(settings, Arc::new(patterns)))
    }

    pub fn patterns(&self) -> &ProductPatterns {
        &self.patterns
    }

    /// Crawls a single domain in its own page
    ///
    /// Navigation and scroll failures degrade to an empty result. Only a page
    /// that cannot be opened at all is reported as an error. The page is
    /// closed even if the crawl panics; the panic is then resumed.
    pub async fn crawl(
        &self,
        engine: &dyn BrowserEngine,
        domain: &str,
    ) -> Result<DomainReport, ScoutError> {
        info!("Crawling domain: {}", domain);

        let mut page = engine.open_page().await?;

        let visit = AssertUnwindSafe(async {
            let outcome = fetch_with_scrolling(page.as_mut(), domain, &self.settings).await;

            let urls = extract_urls(&outcome.markup);
            info!("Extracted {} URLs from {}", urls.len(), domain);

            let product_urls = classify(&urls, &self.patterns);
            info!("Filtered {} product URLs on {}", product_urls.len(), domain);

            DomainReport {
                domain: domain.to_string(),
                product_urls,
                links_found: urls.len(),
                phase: outcome.phase,
                scroll_attempts: outcome.attempts,
            }
        })
        .catch_unwind()
        .await;

        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", domain, e);
        }

        match visit {
            Ok(report) => Ok(report),
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}
