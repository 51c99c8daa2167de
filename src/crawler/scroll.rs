//! Scroll-convergence loop
//!
//! Infinite-scroll storefronts inject product tiles as the user scrolls. The
//! loop scrolls to the bottom, waits for a listing indicator (or a flat delay),
//! and repeats while the page keeps growing, up to a fixed number of attempts.
//! A page still loading past the cap is treated as converged.

use crate::browser::{PageSession, SCROLL_HEIGHT_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT};
use crate::config::{BrowserConfig, CrawlerConfig};
use crate::state::CrawlPhase;
use crate::{BrowserError, ScoutError};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Tunables for one page's scroll loop
#[derive(Debug, Clone)]
pub struct ScrollSettings {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    pub max_attempts: u32,
    /// CSS selector group; empty disables the indicator wait
    pub indicator_selector: String,
    pub indicator_timeout: Duration,
    pub fallback_delay: Duration,
}

impl ScrollSettings {
    pub fn from_config(crawler: &CrawlerConfig, browser: &BrowserConfig) -> Self {
        Self {
            user_agent: browser.user_agent.clone(),
            navigation_timeout: crawler.navigation_timeout(),
            max_attempts: crawler.max_scroll_attempts.max(1),
            indicator_selector: crawler.indicator_selector(),
            indicator_timeout: crawler.indicator_timeout(),
            fallback_delay: crawler.fallback_delay(),
        }
    }
}

/// What the scroll loop produced for a page
#[derive(Debug, Clone)]
pub struct ScrollOutcome {
    /// Rendered markup; empty when the page failed
    pub markup: String,
    /// Terminal phase: `Converged` or `Failed`
    pub phase: CrawlPhase,
    /// Scroll iterations performed
    pub attempts: u32,
    /// Last measured content height
    pub final_height: u64,
}

#[derive(Debug, Default)]
struct ScrollProgress {
    phase: CrawlPhase,
    attempts: u32,
    height: u64,
}

/// Navigates to `url`, scrolls until the content height settles, and returns the markup
///
/// Never fails: navigation and evaluation errors are logged and yield an
/// empty markup with phase `Failed`.
pub async fn fetch_with_scrolling(
    page: &mut dyn PageSession,
    url: &str,
    settings: &ScrollSettings,
) -> ScrollOutcome {
    let mut progress = ScrollProgress::default();

    match scroll_until_stable(page, url, settings, &mut progress).await {
        Ok(markup) => ScrollOutcome {
            markup,
            phase: progress.phase,
            attempts: progress.attempts,
            final_height: progress.height,
        },
        Err(e) => {
            error!("Error crawling domain {}: {}", url, e);
            ScrollOutcome {
                markup: String::new(),
                phase: CrawlPhase::Failed,
                attempts: progress.attempts,
                final_height: progress.height,
            }
        }
    }
}

async fn scroll_until_stable(
    page: &mut dyn PageSession,
    url: &str,
    settings: &ScrollSettings,
    progress: &mut ScrollProgress,
) -> Result<String, ScoutError> {
    page.set_user_agent(&settings.user_agent).await?;
    page.navigate(url, settings.navigation_timeout)
        .await
        .map_err(|e| navigation_error(url, e))?;

    progress.phase.transition(CrawlPhase::Scrolling)?;

    loop {
        let previous_height = content_height(page).await?;
        page.evaluate(SCROLL_TO_BOTTOM_SCRIPT).await?;

        wait_for_more_content(page, url, settings).await;

        progress.attempts += 1;
        let current_height = content_height(page).await?;
        progress.height = current_height;

        debug!(
            "Scroll attempt {}/{} on {}: height {} -> {}",
            progress.attempts, settings.max_attempts, url, previous_height, current_height
        );

        if current_height <= previous_height || progress.attempts >= settings.max_attempts {
            break;
        }
        progress.phase.transition(CrawlPhase::Scrolling)?;
    }

    let markup = page.content().await?;
    progress.phase.transition(CrawlPhase::Converged)?;

    Ok(markup)
}

/// Waits for a listing indicator, falling back to a flat delay
async fn wait_for_more_content(page: &mut dyn PageSession, url: &str, settings: &ScrollSettings) {
    if !settings.indicator_selector.is_empty() {
        match page
            .wait_for_visible(&settings.indicator_selector, settings.indicator_timeout)
            .await
        {
            Ok(()) => return,
            Err(e) => debug!("Indicator wait on {} ended: {}", url, e),
        }
    }

    warn!("Fallback: waiting for body content on {}", url);
    tokio::time::sleep(settings.fallback_delay).await;
}

/// Reads the page body's scrollable height
async fn content_height(page: &mut dyn PageSession) -> Result<u64, ScoutError> {
    let value = page.evaluate(SCROLL_HEIGHT_SCRIPT).await?;

    value
        .as_u64()
        .or_else(|| value.as_f64().map(|h| h.max(0.0) as u64))
        .ok_or_else(|| {
            BrowserError::Evaluation(format!("scroll height is not a number: {}", value)).into()
        })
}

fn navigation_error(url: &str, error: BrowserError) -> ScoutError {
    match error {
        BrowserError::Timeout { timeout_ms, .. } => ScoutError::Timeout {
            url: url.to_string(),
            timeout_ms,
        },
        other => ScoutError::Navigation {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}
