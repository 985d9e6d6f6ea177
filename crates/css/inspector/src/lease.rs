//! Scoped page acquisition and the per-page mutation lock registry.

use core::ops::Deref;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tokio::sync::Mutex as AsyncMutex;

use crate::collaborators::PageProvider;

/// A page checked out from a [`PageProvider`]; released exactly once on drop.
pub struct PageLease<'provider, P: PageProvider> {
    provider: &'provider P,
    url: String,
    page: P::Page,
}

impl<'provider, P: PageProvider> PageLease<'provider, P> {
    /// Acquire the page for `url`. Nothing is released if acquisition fails.
    ///
    /// # Errors
    /// Returns the provider's error if the page cannot be opened.
    pub async fn acquire(provider: &'provider P, url: &str) -> anyhow::Result<Self> {
        let page = provider.get_page(url).await?;
        debug!("[LEASE] acquired {url}");
        Ok(Self {
            provider,
            url: url.to_owned(),
            page,
        })
    }

    /// URL the page was acquired for.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<P: PageProvider> Deref for PageLease<'_, P> {
    type Target = P::Page;

    fn deref(&self) -> &Self::Target {
        &self.page
    }
}

impl<P: PageProvider> Drop for PageLease<'_, P> {
    fn drop(&mut self) {
        debug!("[LEASE] releasing {}", self.url);
        self.provider.release_page(&self.url);
    }
}

/// Async mutexes keyed by page URL, serializing DOM mutations on the same page.
#[derive(Default)]
pub struct PageLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl PageLocks {
    /// Lock shared by every request targeting `url`.
    pub fn for_page(&self, url: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(url.to_owned()).or_default())
    }

    /// Number of pages that have had a lock created.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no lock has been created yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_url_shares_a_lock() {
        let locks = PageLocks::default();
        let first = locks.for_page("https://a.test/");
        let second = locks.for_page("https://a.test/");
        let other = locks.for_page("https://b.test/");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(locks.len(), 2);
    }
}
