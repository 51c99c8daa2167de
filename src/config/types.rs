use serde::Deserialize;
use std::time::Duration;

/// Storefronts crawled when no configuration file overrides them
pub const DEFAULT_DOMAINS: &[&str] = &[
    "https://www.flipkart.com",
    "https://www.amazon.in",
    "https://www.meesho.com",
    "https://www.snapdeal.com",
    "https://www.jabong.com",
    "https://www.paytmmall.com",
];

/// Common e-commerce path shapes for single-product pages
pub const DEFAULT_PRODUCT_PATTERNS: &[&str] = &[
    r"/product/",
    r"/item/",
    r"/p/",
    r"/dp/",
    r"/gp/",
    r"/products/",
    r"/items/",
    r"/product-details/",
    r"/offer/",
    r"/store/",
    r"/catalog/.*/dp/",
    r"/cat/.*/product/",
];

/// Elements whose appearance means a product listing has rendered or is loading
pub const DEFAULT_INDICATOR_SELECTORS: &[&str] = &[
    ".product-grid",
    ".product-list",
    ".loading",
    ".s-product-grid",
    ".search-results",
];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// Main configuration structure for Product-Scout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,

    /// Seed storefront URLs, one crawl task each
    pub domains: Vec<String>,

    /// Regular expressions identifying product-detail URLs
    #[serde(rename = "product-patterns")]
    pub product_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            browser: BrowserConfig::default(),
            output: OutputConfig::default(),
            domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
            product_patterns: DEFAULT_PRODUCT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Scroll loop and retry tunables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Upper bound for the initial navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Maximum number of scroll-and-wait iterations per domain
    #[serde(rename = "max-scroll-attempts")]
    pub max_scroll_attempts: u32,

    /// How long to wait for a listing indicator after each scroll (milliseconds)
    #[serde(rename = "indicator-timeout-ms")]
    pub indicator_timeout_ms: u64,

    /// Flat delay used when no indicator shows up in time (milliseconds)
    #[serde(rename = "fallback-delay-ms")]
    pub fallback_delay_ms: u64,

    /// CSS selectors signalling that product content is present or loading
    #[serde(rename = "indicator-selectors")]
    pub indicator_selectors: Vec<String>,

    /// Attempts per domain when the crawl task itself errors (1 = no retry)
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff between attempts (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,
}

impl CrawlerConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn indicator_timeout(&self) -> Duration {
        Duration::from_millis(self.indicator_timeout_ms)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Joins the indicator selectors into a single CSS selector group
    pub fn indicator_selector(&self) -> String {
        self.indicator_selectors.join(", ")
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 60_000,
            max_scroll_attempts: 10,
            indicator_timeout_ms: 30_000,
            fallback_delay_ms: 2_000,
            indicator_selectors: DEFAULT_INDICATOR_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_attempts: 1,
            retry_backoff_ms: 1_000,
        }
    }
}

/// Headless browser launch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// User-Agent string sent by every page
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Run without a visible window
    pub headless: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when absent
    #[serde(rename = "chrome-executable")]
    pub chrome_executable: Option<String>,

    /// Extra command-line switches passed to the browser
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
            chrome_executable: None,
            args: vec![
                "--no-sandbox".to_string(),
                "--disable-setuid-sandbox".to_string(),
                "--disable-http2".to_string(),
            ],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the timestamped result files
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
        }
    }
}
