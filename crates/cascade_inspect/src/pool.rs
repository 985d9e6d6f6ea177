//! Pages shared per URL, backed by one headless browser.
//!
//! A page is opened and navigated on its first lease and closed once its last lease is
//! returned.

use core::time::Duration;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context as _, Result, anyhow};
use chromiumoxide::page::Page;
use css_inspector::PageProvider;
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::timeout;
use url::Url;

use crate::chrome::{ChromeConfig, ChromeSession, launch_browser};

struct PooledPage {
    page: Page,
    leases: usize,
}

/// [`PageProvider`] over Chrome tabs.
pub struct ChromePagePool {
    session: AsyncMutex<ChromeSession>,
    pages: Mutex<HashMap<String, PooledPage>>,
    navigation_timeout: Duration,
}

impl ChromePagePool {
    /// Launch a browser and wrap it in a pool.
    ///
    /// # Errors
    /// Returns an error if the browser cannot be launched.
    pub async fn launch(config: &ChromeConfig) -> Result<Self> {
        let session = launch_browser(config).await?;
        Ok(Self::from_session(
            session,
            Duration::from_millis(config.navigation_timeout_ms),
        ))
    }

    /// Pool over an already running browser.
    pub fn from_session(session: ChromeSession, navigation_timeout: Duration) -> Self {
        Self {
            session: AsyncMutex::new(session),
            pages: Mutex::new(HashMap::new()),
            navigation_timeout,
        }
    }

    /// Number of pages currently open.
    pub fn open_pages(&self) -> usize {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Close every page and the browser.
    ///
    /// # Errors
    /// Returns an error if the browser does not shut down cleanly.
    pub async fn shutdown(&self) -> Result<()> {
        let pages: Vec<Page> = self
            .pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, pooled)| pooled.page)
            .collect();
        for page in pages {
            if let Err(err) = page.close().await {
                debug!("[POOL] closing page during shutdown: {err}");
            }
        }
        let mut session = self.session.lock().await;
        session.browser.close().await?;
        session.browser.wait().await?;
        session.handler.abort();
        Ok(())
    }

    fn lease_existing(&self, url: &str) -> Option<Page> {
        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        let pooled = pages.get_mut(url)?;
        pooled.leases += 1;
        debug!("[POOL] reusing {url} ({} leases)", pooled.leases);
        Some(pooled.page.clone())
    }

    async fn open(&self, session: &ChromeSession, url: &Url) -> Result<Page> {
        info!("[POOL] opening {url}");
        let page = session.browser.new_page("about:blank").await?;
        let navigation = async {
            page.goto(url.as_str()).await?;
            page.wait_for_navigation().await?;
            anyhow::Ok(())
        };
        let outcome = timeout(self.navigation_timeout, navigation)
            .await
            .unwrap_or_else(|_| {
                Err(anyhow!(
                    "navigation to {url} timed out after {:?}",
                    self.navigation_timeout
                ))
            });
        if let Err(err) = outcome {
            if let Err(close_err) = page.close().await {
                debug!("[POOL] closing failed page: {close_err}");
            }
            return Err(err);
        }
        Ok(page)
    }
}

impl PageProvider for ChromePagePool {
    type Page = Page;

    async fn get_page(&self, url: &str) -> Result<Page> {
        if let Some(page) = self.lease_existing(url) {
            return Ok(page);
        }
        let parsed = Url::parse(url).with_context(|| format!("invalid page url `{url}`"))?;
        // Holding the session serializes page creation, so a URL is only opened once.
        let session = self.session.lock().await;
        if let Some(page) = self.lease_existing(url) {
            return Ok(page);
        }
        let page = self.open(&session, &parsed).await?;
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                url.to_owned(),
                PooledPage {
                    page: page.clone(),
                    leases: 1,
                },
            );
        Ok(page)
    }

    fn release_page(&self, url: &str) {
        let closing = {
            let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(pooled) = pages.get_mut(url) else {
                warn!("[POOL] release of unknown page {url}");
                return;
            };
            pooled.leases = pooled.leases.saturating_sub(1);
            if pooled.leases > 0 {
                return;
            }
            pages.remove(url).map(|entry| entry.page)
        };
        let Some(page) = closing else {
            return;
        };
        debug!("[POOL] closing {url}");
        match Handle::try_current() {
            Ok(handle) => {
                let _close_task = handle.spawn(async move {
                    if let Err(err) = page.close().await {
                        warn!("[POOL] failed to close page: {err}");
                    }
                });
            }
            Err(_) => warn!("[POOL] no runtime to close {url}; left for browser shutdown"),
        }
    }
}

impl Drop for ChromePagePool {
    fn drop(&mut self) {
        self.session.get_mut().handler.abort();
    }
}
