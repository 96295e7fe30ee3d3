//! In-memory fetcher for tests. Serves canned HTML per URL and records every call.

use super::{Cookie, FetchError, PageFetcher, RenderedPage};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct FakeFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    current: Option<RenderedPage>,
    pub cookies: Vec<Cookie>,
    /// URLs navigated to, in order.
    pub visited: Vec<String>,
    /// Set when cookies were installed after a navigation had already happened.
    pub cookies_after_navigation: bool,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Navigation to `url` fails as if the page timed out.
    pub fn with_failure(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }
}

impl PageFetcher for FakeFetcher {
    fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<(), FetchError> {
        if !self.visited.is_empty() {
            self.cookies_after_navigation = true;
        }
        self.cookies.extend_from_slice(cookies);
        Ok(())
    }

    fn navigate(&mut self, url: &str) -> Result<RenderedPage, FetchError> {
        self.visited.push(url.to_string());
        if self.failing.contains(url) {
            self.current = None;
            return Err(FetchError::Navigation {
                url: url.to_string(),
                reason: "navigation timed out".to_string(),
            });
        }
        let html = self.pages.get(url).ok_or_else(|| FetchError::Navigation {
            url: url.to_string(),
            reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        })?;
        let page = RenderedPage::new(url, html.clone());
        self.current = Some(page.clone());
        Ok(page)
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<RenderedPage, FetchError> {
        let page = self.current.clone().ok_or_else(|| FetchError::Content {
            url: String::new(),
            reason: "no page loaded".to_string(),
        })?;
        let sel = Selector::parse(selector).map_err(|e| FetchError::Content {
            url: page.url.clone(),
            reason: e.to_string(),
        })?;
        if Html::parse_document(&page.html).select(&sel).next().is_none() {
            return Err(FetchError::ElementWait {
                url: page.url.clone(),
                selector: selector.to_string(),
                timeout_secs: timeout.as_secs(),
                reason: "timed out".to_string(),
            });
        }
        Ok(page)
    }
}
