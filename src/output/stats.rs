//! Run statistics derived from a crawl result
//!
//! This module summarises how many domains produced product URLs and how long
//! the run took.

use crate::output::CrawlResult;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Number of domains crawled
    pub total_domains: usize,

    /// Domains with at least one product URL
    pub domains_with_products: usize,

    /// Domains that ended with no product URLs (failed or simply empty)
    pub empty_domains: Vec<String>,

    /// Product URLs across all domains (not deduplicated across domains)
    pub total_product_urls: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStatistics {
    pub fn from_results(results: &CrawlResult, elapsed: Duration) -> Self {
        let empty_domains: Vec<String> = results
            .iter()
            .filter(|(_, urls)| urls.is_empty())
            .map(|(domain, _)| domain.clone())
            .collect();

        Self {
            total_domains: results.len(),
            domains_with_products: results.len() - empty_domains.len(),
            empty_domains,
            total_product_urls: results.values().map(Vec::len).sum(),
            elapsed,
        }
    }

    /// Percentage of domains that yielded product URLs
    pub fn yield_rate(&self) -> f64 {
        if self.total_domains == 0 {
            return 0.0;
        }
        (self.domains_with_products as f64 / self.total_domains as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Domains crawled: {}", stats.total_domains);
    println!("  Product URLs found: {}", stats.total_product_urls);
    println!("  Duration: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    if !stats.empty_domains.is_empty() {
        println!("Domains Without Results ({}):", stats.empty_domains.len());
        for domain in &stats.empty_domains {
            println!("  - {}", domain);
        }
        println!();
    }

    println!(
        "Yield Rate: {:.1}% ({} / {} domains returned product URLs)",
        stats.yield_rate(),
        stats.domains_with_products,
        stats.total_domains
    );
}
