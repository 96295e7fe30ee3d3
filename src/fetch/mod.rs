//! Page fetching. The [PageFetcher] trait is the seam between the scrape logic and the browser.

mod chrome;
mod cookies;
mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use chrome::{ChromeFetcher, ChromeFetcherBuilder};
pub use cookies::{parse_cookie_string, Cookie};
pub use error::{CookieParseError, FetchError};

use scraper::Html;
use std::time::Duration;

/// Snapshot of a rendered page: final URL (after redirects) and serialized DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// A single rendering surface that loads one page at a time.
///
/// All methods take `&mut self`: only one navigation can be in flight, and a
/// fetcher is never shared between concurrent tasks.
pub trait PageFetcher {
    /// Install session cookies. Must be called before the first navigation.
    fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<(), FetchError>;

    /// Load `url` and block until the document has loaded. Returns the DOM at that point.
    fn navigate(&mut self, url: &str) -> Result<RenderedPage, FetchError>;

    /// Block until `selector` matches an element on the current page, then return a fresh snapshot.
    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<RenderedPage, FetchError>;
}
