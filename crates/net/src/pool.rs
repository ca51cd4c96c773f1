//! A bounded pool of headless-browser pages, capped by a `Semaphore` the
//! way `other_examples`' `LinkRewriter` bounds concurrent rewrite tasks —
//! one browser process, many pages, never more than `pool_size` loading
//! at once.

use core::time::Duration;
use std::sync::Arc;

use archive_core::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use url::Url;

/// What rendering a page under JS execution yields: its final HTML and a
/// full-page PNG screenshot.
pub struct RenderedPage {
    pub html: String,
    pub screenshot_png: Vec<u8>,
    pub final_url: Url,
}

/// Owns a single headless Chromium process and bounds concurrent page
/// loads to `pool_size`.
pub struct BrowserPool {
    browser: Browser,
    semaphore: Arc<Semaphore>,
    page_load_timeout: Duration,
}

impl BrowserPool {
    /// Launch a headless browser and spawn its event-handling task.
    ///
    /// # Errors
    /// Returns `Error::Fatal` if the browser process cannot be launched.
    pub async fn launch(pool_size: usize, page_load_timeout: Duration) -> Result<(Self, JoinHandle<()>)> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(|source| Error::Fatal(format!("invalid browser config: {source}")))?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|source| Error::Fatal(format!("failed to launch headless browser: {source}")))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    log::warn!("browser event stream closed with an error");
                    break;
                }
            }
        });

        Ok((
            Self {
                browser,
                semaphore: Arc::new(Semaphore::new(pool_size.max(1))),
                page_load_timeout,
            },
            handle,
        ))
    }

    /// Load `url` under full JS execution, waiting for navigation to
    /// settle before reading the final DOM and a full-page screenshot.
    pub async fn render(&self, url: &Url) -> Result<RenderedPage> {
        let _permit = self.semaphore.acquire().await.map_err(|_| Error::Pool)?;

        let page = tokio::time::timeout(self.page_load_timeout, self.browser.new_page(url.as_str()))
            .await
            .map_err(|_| Error::Pool)?
            .map_err(|source| Error::Network {
                url: url.to_string(),
                message: source.to_string(),
            })?;

        page.wait_for_navigation().await.map_err(|source| Error::Network {
            url: url.to_string(),
            message: source.to_string(),
        })?;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|raw| Url::parse(&raw).ok())
            .unwrap_or_else(|| url.clone());

        let html = page.content().await.map_err(|source| Error::Network {
            url: url.to_string(),
            message: source.to_string(),
        })?;

        let screenshot_png = page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|source| Error::Network {
                url: url.to_string(),
                message: source.to_string(),
            })?;

        let _ = page.close().await;

        Ok(RenderedPage {
            html,
            screenshot_png,
            final_url,
        })
    }
}
