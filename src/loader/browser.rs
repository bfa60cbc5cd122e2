//! Live feed loading through a headless Chrome session.
//!
//! The session is driven over the DevTools protocol with `chromiumoxide`.
//! Each snapshot cycle is:
//!
//! 1. Poll until the marker element (the author-name selector) is present,
//!    bounded by the wait timeout
//! 2. Scroll to the bottom of the page
//! 3. Settle: wait for more marker elements to render (or the fixed delay)
//! 4. Capture the full page markup
//!
//! # Resource handling
//!
//! [`BrowserFeed::open`] launches Chrome and spawns the protocol handler
//! task. [`SnapshotSource::close`] shuts the browser down and waits for the
//! process to exit. If a feed is dropped without being closed, the handler
//! task is aborted and `chromiumoxide` kills the child process.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

use super::{SettleStrategy, SnapshotSource};
use crate::error::{Result, ScrapeError};
use crate::models::Snapshot;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Launch and pacing options for a browser session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub headless: bool,
    /// Selector whose presence means the feed has rendered.
    pub marker: String,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub settle: SettleStrategy,
    /// Upper bound for the post-scroll settle.
    pub settle_delay: Duration,
    pub chrome_executable: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            marker: r#"span[slot="authorName"]"#.to_string(),
            wait_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(250),
            settle: SettleStrategy::default(),
            settle_delay: Duration::from_secs(5),
            chrome_executable: None,
        }
    }
}

impl SessionOptions {
    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(ScrapeError::ResourceAcquisition)
    }
}

/// JavaScript expression counting the elements matching `selector`.
fn count_expression(selector: &str) -> Result<String> {
    let quoted = serde_json::to_string(selector)?;
    Ok(format!("document.querySelectorAll({quoted}).length"))
}

/// An open browser tab positioned on the feed.
pub struct BrowserFeed {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    count_js: String,
    options: SessionOptions,
}

impl BrowserFeed {
    /// Launch Chrome and navigate to `url`.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::ResourceAcquisition`] if Chrome cannot be started or
    /// the page cannot be opened. The browser is shut down before returning.
    #[instrument(level = "info", skip(options), fields(headless = options.headless))]
    pub async fn open(url: &str, options: SessionOptions) -> Result<Self> {
        let count_js = count_expression(&options.marker)?;
        let config = options.browser_config()?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::ResourceAcquisition(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler event failed");
                }
            }
            debug!("Browser handler stream ended");
        });

        let page = match browser.new_page(url).await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!(error = %close_err, "Failed to close browser after open error");
                }
                handler.abort();
                return Err(ScrapeError::ResourceAcquisition(format!(
                    "could not open {url}: {e}"
                )));
            }
        };

        info!("Browser session opened");
        Ok(Self {
            browser,
            handler,
            page,
            count_js,
            options,
        })
    }

    async fn marker_count(&self) -> Result<usize> {
        let count: f64 = self
            .page
            .evaluate(self.count_js.as_str())
            .await?
            .into_value()?;
        Ok(count as usize)
    }

    async fn poll_for_marker(&self) -> Result<usize> {
        loop {
            let count = self.marker_count().await?;
            if count > 0 {
                return Ok(count);
            }
            sleep(self.options.poll_interval).await;
        }
    }

    async fn wait_for_marker(&self) -> Result<usize> {
        match timeout(self.options.wait_timeout, self.poll_for_marker()).await {
            Ok(found) => found,
            Err(_) => Err(ScrapeError::LoadTimeout {
                selector: self.options.marker.clone(),
                waited: self.options.wait_timeout,
            }),
        }
    }

    async fn poll_for_growth(&self, before: usize) -> Result<usize> {
        loop {
            sleep(self.options.poll_interval).await;
            let count = self.marker_count().await?;
            if count > before {
                return Ok(count);
            }
        }
    }

    async fn settle(&self, before: usize) -> Result<()> {
        match self.options.settle {
            SettleStrategy::Fixed => sleep(self.options.settle_delay).await,
            SettleStrategy::Growth => {
                match timeout(self.options.settle_delay, self.poll_for_growth(before)).await {
                    Ok(grown) => {
                        let after = grown?;
                        debug!(before, after, "Feed grew after scroll");
                    }
                    Err(_) => debug!(before, "No growth within settle delay"),
                }
            }
        }
        Ok(())
    }
}

impl SnapshotSource for BrowserFeed {
    #[instrument(level = "debug", skip_all)]
    async fn next_snapshot(&mut self) -> Result<Snapshot> {
        let before = self.wait_for_marker().await?;
        self.page.evaluate(SCROLL_TO_BOTTOM).await?;
        self.settle(before).await?;

        let markup = self.page.content().await?;
        debug!(bytes = markup.len(), "Captured page markup");
        Ok(Snapshot::new(markup))
    }

    async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Browser process did not exit cleanly");
        }
        info!("Browser session closed");
        Ok(())
    }
}

impl Drop for BrowserFeed {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_expression_quotes_selector() {
        let js = count_expression(r#"span[slot="authorName"]"#).unwrap();
        assert_eq!(
            js,
            r#"document.querySelectorAll("span[slot=\"authorName\"]").length"#
        );
    }

    #[test]
    fn test_count_expression_single_quotes() {
        let js = count_expression("span[slot='authorName']").unwrap();
        assert_eq!(js, r#"document.querySelectorAll("span[slot='authorName']").length"#);
    }

    #[test]
    fn test_default_session_options() {
        let options = SessionOptions::default();
        assert!(options.headless);
        assert_eq!(options.wait_timeout, Duration::from_secs(20));
        assert_eq!(options.settle_delay, Duration::from_secs(5));
        assert_eq!(options.settle, SettleStrategy::Growth);
    }

    #[tokio::test]
    async fn test_open_without_chrome_is_resource_acquisition() {
        let options = SessionOptions {
            chrome_executable: Some(PathBuf::from("/nonexistent/chrome")),
            ..SessionOptions::default()
        };
        let err = BrowserFeed::open("https://example.com/", options)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ScrapeError::ResourceAcquisition(_)));
    }

    #[test]
    fn test_browser_config_builds() {
        let options = SessionOptions {
            headless: false,
            chrome_executable: Some(PathBuf::from("/usr/bin/chromium")),
            ..SessionOptions::default()
        };
        assert!(options.browser_config().is_ok());
    }
}
