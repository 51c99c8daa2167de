//! Integration tests for the crawler
//!
//! These tests drive the coordinator end-to-end against a scripted in-memory
//! browser, so page behaviour (growing content, timeouts, crashes) can be
//! controlled without launching Chromium.

use async_trait::async_trait;
use chrono::Utc;
use product_scout::browser::{
    BrowserEngine, PageSession, SCROLL_HEIGHT_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT,
};
use product_scout::config::{Config, DEFAULT_PRODUCT_PATTERNS};
use product_scout::crawler::{
    crawl_with_engine, Coordinator, DomainCrawler, RetryPolicy, ScrollSettings,
};
use product_scout::output::{output_file_name, CrawlResult, OUTPUT_FILE_PREFIX};
use product_scout::url::ProductPatterns;
use product_scout::{BrowserError, BrowserResult, ScoutError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// How a scripted site responds to navigation
#[derive(Clone)]
enum Navigation {
    Loads,
    TimesOut,
    Fails,
}

/// Scripted storefront behaviour
#[derive(Clone)]
struct Site {
    markup: String,
    navigation: Navigation,
    /// Content height grows by this much per scroll (0 = static page)
    growth_per_scroll: u64,
    indicator_visible: bool,
    panic_on_content: bool,
}

impl Site {
    fn new(markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            navigation: Navigation::Loads,
            growth_per_scroll: 0,
            indicator_visible: true,
            panic_on_content: false,
        }
    }
}

/// In-memory browser serving scripted sites by URL
#[derive(Default)]
struct ScriptedBrowser {
    sites: HashMap<String, Site>,
    /// Number of upcoming `open_page` calls that should fail
    failing_opens: AtomicU32,
    pages_opened: AtomicU32,
    pages_closed: Arc<AtomicU32>,
    scrolls: Arc<AtomicU32>,
    closed: AtomicBool,
}

impl ScriptedBrowser {
    fn with_site(mut self, url: &str, site: Site) -> Self {
        self.sites.insert(url.to_string(), site);
        self
    }
}

#[async_trait]
impl BrowserEngine for ScriptedBrowser {
    async fn open_page(&self) -> BrowserResult<Box<dyn PageSession>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BrowserError::Closed("browser closed".to_string()));
        }

        let remaining = self.failing_opens.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_opens.store(remaining - 1, Ordering::SeqCst);
            return Err(BrowserError::Page("target crashed".to_string()));
        }

        self.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedPage {
            sites: self.sites.clone(),
            current: None,
            height: 1000,
            pages_closed: Arc::clone(&self.pages_closed),
            scrolls: Arc::clone(&self.scrolls),
        }))
    }

    async fn close(&self) -> BrowserResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct ScriptedPage {
    sites: HashMap<String, Site>,
    current: Option<Site>,
    height: u64,
    pages_closed: Arc<AtomicU32>,
    scrolls: Arc<AtomicU32>,
}

impl ScriptedPage {
    fn site(&self) -> BrowserResult<&Site> {
        self.current
            .as_ref()
            .ok_or_else(|| BrowserError::Evaluation("no document loaded".to_string()))
    }
}

#[async_trait]
impl PageSession for ScriptedPage {
    async fn set_user_agent(&mut self, _user_agent: &str) -> BrowserResult<()> {
        Ok(())
    }

    async fn navigate(&mut self, url: &str, timeout: Duration) -> BrowserResult<()> {
        let site = self
            .sites
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })?;

        match site.navigation {
            Navigation::Loads => {
                self.current = Some(site);
                Ok(())
            }
            Navigation::TimesOut => Err(BrowserError::Timeout {
                what: format!("navigation to {}", url),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Navigation::Fails => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            }),
        }
    }

    async fn evaluate(&mut self, script: &str) -> BrowserResult<Value> {
        let growth = self.site()?.growth_per_scroll;

        if script == SCROLL_HEIGHT_SCRIPT {
            Ok(json!(self.height))
        } else if script == SCROLL_TO_BOTTOM_SCRIPT {
            self.scrolls.fetch_add(1, Ordering::SeqCst);
            self.height += growth;
            Ok(Value::Null)
        } else {
            Err(BrowserError::Evaluation(format!("unexpected script: {}", script)))
        }
    }

    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        if self.site()?.indicator_visible {
            Ok(())
        } else {
            Err(BrowserError::Timeout {
                what: format!("selector '{}'", selector),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn content(&mut self) -> BrowserResult<String> {
        let site = self.site()?;
        if site.panic_on_content {
            panic!("renderer crashed");
        }
        Ok(site.markup.clone())
    }

    async fn close(self: Box<Self>) -> BrowserResult<()> {
        self.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn fast_settings() -> ScrollSettings {
    ScrollSettings {
        user_agent: "TestAgent/1.0".to_string(),
        navigation_timeout: Duration::from_millis(50),
        max_attempts: 10,
        indicator_selector: ".product-grid".to_string(),
        indicator_timeout: Duration::from_millis(5),
        fallback_delay: Duration::from_millis(1),
    }
}

fn coordinator(domains: &[&str], retry: RetryPolicy) -> Coordinator {
    let patterns = ProductPatterns::new(DEFAULT_PRODUCT_PATTERNS).expect("patterns compile");
    let crawler = DomainCrawler::new(fast_settings(), Arc::new(patterns));
    Coordinator::with_crawler(domains.iter().map(|d| d.to_string()).collect(), crawler, retry)
}

const STOREFRONT: &str = r#"<html><body>
    <a href="https://x.com/product/123">a</a>
    <a href="https://x.com/about">b</a>
    <a href="https://x.com/product/123">again</a>
    <script>window.next = "https://x.com/dp/B0042";</script>
</body></html>"#;

#[tokio::test]
async fn test_single_domain_end_to_end() {
    let browser = ScriptedBrowser::default().with_site("https://x.com", Site::new(STOREFRONT));
    let browser = Arc::new(browser);

    let results = coordinator(&["https://x.com"], RetryPolicy::none())
        .run(browser.clone())
        .await;

    let mut urls = results["https://x.com"].clone();
    urls.sort();
    assert_eq!(urls, vec!["https://x.com/dp/B0042", "https://x.com/product/123"]);

    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 1);
    assert_eq!(browser.pages_closed.load(Ordering::SeqCst), 1);
    assert!(browser.closed.load(Ordering::SeqCst));
}

/// Config pointing at `output_dir` with millisecond waits
fn test_config(domains: &[&str], output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.domains = domains.iter().map(|d| d.to_string()).collect();
    config.output.directory = output_dir.display().to_string();
    config.crawler.navigation_timeout_ms = 50;
    config.crawler.indicator_timeout_ms = 5;
    config.crawler.fallback_delay_ms = 1;
    config
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_empty_domain_list_writes_empty_object() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("nested").join("output");
    let browser = Arc::new(ScriptedBrowser::default());

    let run = crawl_with_engine(&test_config(&[], &output_dir), browser.clone())
        .await
        .unwrap();

    assert_eq!(run.output_path.parent(), Some(output_dir.as_path()));
    assert_eq!(std::fs::read_to_string(&run.output_path).unwrap(), "{}");
    assert_eq!(run.statistics.total_domains, 0);
    assert!(browser.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_navigation_timeout_yields_empty_entry_and_file_is_written() {
    let mut stalled = Site::new(STOREFRONT);
    stalled.navigation = Navigation::TimesOut;

    let browser = Arc::new(
        ScriptedBrowser::default()
            .with_site("https://slow.example", stalled)
            .with_site("https://x.com", Site::new(STOREFRONT)),
    );

    let dir = TempDir::new().unwrap();
    let config = test_config(&["https://slow.example", "https://x.com"], dir.path());
    let run = crawl_with_engine(&config, browser.clone()).await.unwrap();

    let written = read_json(&run.output_path);
    assert_eq!(written["https://slow.example"], json!([]));
    assert_eq!(
        written["https://x.com"],
        json!(["https://x.com/dp/B0042", "https://x.com/product/123"])
    );
    assert_eq!(run.statistics.total_domains, 2);
    assert_eq!(run.statistics.total_product_urls, 2);
    assert_eq!(browser.pages_closed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_output_file_named_after_crawl_start() {
    let browser = Arc::new(ScriptedBrowser::default().with_site("https://x.com", Site::new(STOREFRONT)));
    let dir = TempDir::new().unwrap();

    let before = Utc::now();
    let run = crawl_with_engine(&test_config(&["https://x.com"], dir.path()), browser)
        .await
        .unwrap();
    let after = Utc::now();

    let name = run.output_path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with(OUTPUT_FILE_PREFIX));
    assert!(name.as_str() >= output_file_name(before).as_str());
    assert!(name.as_str() <= output_file_name(after).as_str());
}

#[tokio::test]
async fn test_output_write_failure_is_returned() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, "occupied").unwrap();

    let browser = Arc::new(ScriptedBrowser::default().with_site("https://x.com", Site::new(STOREFRONT)));
    let result = crawl_with_engine(&test_config(&["https://x.com"], &blocker), browser.clone()).await;

    assert!(matches!(result, Err(ScoutError::Io(_))));
    assert!(browser.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_panicking_domain_still_closes_its_page() {
    let mut crashing = Site::new(STOREFRONT);
    crashing.panic_on_content = true;

    let browser = Arc::new(
        ScriptedBrowser::default()
            .with_site("https://crash.example", crashing)
            .with_site("https://x.com", Site::new(STOREFRONT)),
    );

    let results = coordinator(&["https://crash.example", "https://x.com"], RetryPolicy::none())
        .run(browser.clone())
        .await;

    assert!(results["https://crash.example"].is_empty());
    assert_eq!(results["https://x.com"].len(), 2);
    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 2);
    assert_eq!(browser.pages_closed.load(Ordering::SeqCst), 2);
    assert!(browser.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_every_domain_keeps_an_entry() {
    let mut broken = Site::new(STOREFRONT);
    broken.navigation = Navigation::Fails;
    let mut crashing = Site::new(STOREFRONT);
    crashing.panic_on_content = true;

    let browser = Arc::new(
        ScriptedBrowser::default()
            .with_site("https://broken.example", broken)
            .with_site("https://crash.example", crashing)
            .with_site("https://x.com", Site::new(STOREFRONT)),
    );

    let domains = [
        "https://broken.example",
        "https://crash.example",
        "https://unknown.example",
        "https://x.com",
    ];
    let results = coordinator(&domains, RetryPolicy::none()).run(browser).await;

    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(keys.len(), domains.len());
    for domain in domains {
        assert!(results.contains_key(domain), "missing entry for {}", domain);
    }

    assert!(results["https://broken.example"].is_empty());
    assert!(results["https://crash.example"].is_empty());
    assert!(results["https://unknown.example"].is_empty());
    assert_eq!(results["https://x.com"].len(), 2);
}

#[tokio::test]
async fn test_infinite_scroll_stops_at_attempt_cap() {
    let mut endless = Site::new(STOREFRONT);
    endless.growth_per_scroll = 500;

    let browser = Arc::new(ScriptedBrowser::default().with_site("https://x.com", endless));
    let results = coordinator(&["https://x.com"], RetryPolicy::none())
        .run(browser.clone())
        .await;

    assert_eq!(browser.scrolls.load(Ordering::SeqCst), 10);
    assert_eq!(results["https://x.com"].len(), 2);
}

#[tokio::test]
async fn test_missing_indicator_falls_back_and_still_collects() {
    let mut plain = Site::new(STOREFRONT);
    plain.indicator_visible = false;

    let browser = Arc::new(ScriptedBrowser::default().with_site("https://x.com", plain));
    let results = coordinator(&["https://x.com"], RetryPolicy::none())
        .run(browser.clone())
        .await;

    assert_eq!(browser.scrolls.load(Ordering::SeqCst), 1);
    assert_eq!(results["https://x.com"].len(), 2);
}

#[tokio::test]
async fn test_page_open_failure_without_retry_is_empty() {
    let browser = ScriptedBrowser::default().with_site("https://x.com", Site::new(STOREFRONT));
    browser.failing_opens.store(1, Ordering::SeqCst);
    let browser = Arc::new(browser);

    let results = coordinator(&["https://x.com"], RetryPolicy::none())
        .run(browser.clone())
        .await;

    assert!(results["https://x.com"].is_empty());
    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_page_open_failure_is_retried() {
    let browser = ScriptedBrowser::default().with_site("https://x.com", Site::new(STOREFRONT));
    browser.failing_opens.store(2, Ordering::SeqCst);
    let browser = Arc::new(browser);

    let retry = RetryPolicy::new(3, Duration::from_millis(1));
    let results = coordinator(&["https://x.com"], retry).run(browser.clone()).await;

    assert_eq!(results["https://x.com"].len(), 2);
    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_navigation_failure_is_not_retried() {
    let mut broken = Site::new(STOREFRONT);
    broken.navigation = Navigation::Fails;

    let browser = Arc::new(ScriptedBrowser::default().with_site("https://broken.example", broken));
    let retry = RetryPolicy::new(3, Duration::from_millis(1));
    let results = coordinator(&["https://broken.example"], retry)
        .run(browser.clone())
        .await;

    assert!(results["https://broken.example"].is_empty());
    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_coordinator_from_default_config() {
    let config = Config::default();
    let coordinator = Coordinator::new(&config).unwrap();
    assert_eq!(coordinator.domains().len(), 6);

    let results: CrawlResult = coordinator.run(Arc::new(ScriptedBrowser::default())).await;
    assert_eq!(results.len(), 6);
    assert!(results.values().all(Vec::is_empty));
}
