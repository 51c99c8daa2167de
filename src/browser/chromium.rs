//! Headless Chromium engine using chromiumoxide.

use super::{BrowserEngine, PageSession};
use crate::config::BrowserConfig;
use crate::{BrowserError, BrowserResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Resolves once the document has left the `loading` state (DOMContentLoaded)
const CONTENT_PARSED_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState !== 'loading') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
        }
    })
"#;

/// Interval between visibility checks while waiting for a selector
const VISIBILITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Builds a script returning true when any element matching `selector` is visible
///
/// Visible means a non-empty bounding box and no `visibility: hidden`.
fn visibility_script(selector: &str) -> String {
    let quoted = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"(() => {{
            for (const el of document.querySelectorAll({quoted})) {{
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                if (style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0) {{
                    return true;
                }}
            }}
            return false;
        }})()"#
    )
}

/// Drains the DevTools event stream until the connection ends
///
/// Event errors are logged and skipped. Every tab shares this connection, so
/// the loop only stops when the stream itself is exhausted. Returns the
/// number of errors seen.
async fn drive_handler<S, T, E>(mut events: S) -> usize
where
    S: Stream<Item = Result<T, E>> + Unpin,
    E: Display,
{
    let mut errors = 0;
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            errors += 1;
            warn!("Browser handler event error: {}", e);
        }
    }
    errors
}

/// A headless Chromium process driven over the DevTools protocol
pub struct ChromiumEngine {
    browser: RwLock<Option<Browser>>,
    handler: JoinHandle<()>,
}

impl ChromiumEngine {
    /// Launches Chromium with the configured switches
    ///
    /// The binary is auto-detected unless `chrome-executable` is set.
    pub async fn launch(config: &BrowserConfig) -> BrowserResult<Self> {
        let mut builder = LaunchConfig::builder();

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        for arg in &config.args {
            builder = builder.arg(arg.as_str());
        }

        let launch_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            let errors = drive_handler(handler).await;
            debug!("Browser connection ended after {} event errors", errors);
        });

        Ok(Self {
            browser: RwLock::new(Some(browser)),
            handler,
        })
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open_page(&self) -> BrowserResult<Box<dyn PageSession>> {
        let guard = self.browser.read().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| BrowserError::Closed("browser already shut down".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))?;

        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) -> BrowserResult<()> {
        let Some(mut browser) = self.browser.write().await.take() else {
            return Ok(());
        };

        browser
            .close()
            .await
            .map_err(|e| BrowserError::Closed(e.to_string()))?;
        browser
            .wait()
            .await
            .map_err(|e| BrowserError::Closed(e.to_string()))?;
        self.handler.abort();

        Ok(())
    }
}

/// One Chromium tab
pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn set_user_agent(&mut self, user_agent: &str) -> BrowserResult<()> {
        self.page
            .execute(SetUserAgentOverrideParams::new(user_agent.to_string()))
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))?;
        Ok(())
    }

    async fn navigate(&mut self, url: &str, timeout: Duration) -> BrowserResult<()> {
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|message| BrowserError::Navigation {
                url: url.to_string(),
                message,
            })?;

        let navigation = async {
            let response = self
                .page
                .execute(params)
                .await
                .map_err(|e| BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

            if let Some(error_text) = &response.result.error_text {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: error_text.clone(),
                });
            }

            self.page
                .evaluate(CONTENT_PARSED_SCRIPT.to_string())
                .await
                .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

            Ok::<(), BrowserError>(())
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| BrowserError::Timeout {
                what: format!("navigation to {}", url),
                timeout_ms: timeout.as_millis() as u64,
            })?
    }

    async fn evaluate(&mut self, script: &str) -> BrowserResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(script.to_string())
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        let script = visibility_script(selector);

        let poll = async {
            loop {
                let visible = self
                    .page
                    .evaluate(script.clone())
                    .await
                    .map_err(|e| BrowserError::Evaluation(e.to_string()))?
                    .value()
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);

                if visible {
                    return Ok::<(), BrowserError>(());
                }
                tokio::time::sleep(VISIBILITY_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| BrowserError::Timeout {
                what: format!("selector '{}' to become visible", selector),
                timeout_ms: timeout.as_millis() as u64,
            })?
    }

    async fn content(&mut self) -> BrowserResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))
    }

    async fn close(self: Box<Self>) -> BrowserResult<()> {
        self.page
            .close()
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))
    }
}
