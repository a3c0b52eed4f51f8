use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::app::RanksnapError;
use crate::config::{ScrapeConfig, SelectorConfig};
use crate::domain::PageRequest;
use crate::fetcher::{FetchError, PageContent, PageFetcher};

const READINESS_POLL_MS: u64 = 250;

/// Headless-Chrome page fetcher.
///
/// The browser session is a scoped resource: launched once per run and
/// released via [`close`](ChromeFetcher::close) on every pipeline exit path.
/// chromiumoxide additionally kills the child process on drop, so an
/// unwound run does not leak a browser.
pub struct ChromeFetcher {
    browser: Browser,
    handler_task: JoinHandle<()>,
    config: ScrapeConfig,
    selectors: SelectorConfig,
}

impl ChromeFetcher {
    pub async fn launch(
        config: ScrapeConfig,
        selectors: SelectorConfig,
    ) -> Result<Self, RanksnapError> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| RanksnapError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            RanksnapError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive the CDP event stream for the lifetime of the session
        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        Ok(Self {
            browser,
            handler_task,
            config,
            selectors,
        })
    }

    /// Shut the session down. Invoked on every pipeline exit path,
    /// COMPLETE and PARTIAL alike.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        self.handler_task.abort();
    }

    /// Wait for the listing container to be present, bounded by the
    /// configured timeout. Block pages are detected while waiting, so a
    /// captcha never masquerades as a timeout.
    async fn await_listing(&self, page: &Page) -> Result<PageContent, FetchError> {
        page.wait_for_navigation()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let probe = format!(
            "document.querySelector({:?}) !== null",
            self.selectors.listing_container
        );
        let deadline = tokio::time::Instant::now() + self.config.timeout();

        loop {
            let ready = page
                .evaluate(probe.clone())
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?
                .into_value::<bool>()
                .unwrap_or(false);

            let html = page
                .content()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            if self.looks_blocked(&html) {
                return Err(FetchError::BlockedOrCaptcha);
            }
            if ready {
                return Ok(PageContent { html });
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(FetchError::Timeout(self.config.timeout_secs));
            }

            tokio::time::sleep(Duration::from_millis(READINESS_POLL_MS)).await;
        }
    }

    fn looks_blocked(&self, html: &str) -> bool {
        let lower = html.to_lowercase();
        self.selectors
            .block_markers
            .iter()
            .any(|marker| lower.contains(marker.as_str()))
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<PageContent, FetchError> {
        let url = request.url(&self.config.url_template);
        tracing::debug!(%url, page = request.page, "navigating");

        let page = self
            .browser
            .new_page(url.as_str())
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if let Some(ref ua) = self.config.user_agent {
            if let Err(e) = page.set_user_agent(ua).await {
                let _ = page.close().await;
                return Err(FetchError::Network(e.to_string()));
            }
        }

        let outcome = self.await_listing(&page).await;
        let _ = page.close().await;
        outcome
    }
}
