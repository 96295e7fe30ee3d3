//! Chrome/Chromium-backed fetcher. Drives one tab of a browser launched by `headless_chrome`.

use super::{Cookie, FetchError, PageFetcher, RenderedPage};
use headless_chrome::protocol::cdp::Network::CookieParam;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_WINDOW_SIZE: (u32, u32) = (1080, 1024);
const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;
/// Operator prompts run while the tab sits idle; the browser must not shut itself down meanwhile.
const IDLE_BROWSER_TIMEOUT_SECS: u64 = 60 * 60;

/// A launched browser with a single tab. Not `Clone`: there is one rendering surface per fetcher.
pub struct ChromeFetcher {
    // Dropping the Browser kills the process, so it lives as long as the tab.
    _browser: Browser,
    tab: Arc<Tab>,
    navigation_timeout: Duration,
}

impl ChromeFetcher {
    pub fn builder() -> ChromeFetcherBuilder {
        ChromeFetcherBuilder::default()
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn snapshot(&self) -> Result<RenderedPage, FetchError> {
        let url = self.current_url();
        let html = self.tab.get_content().map_err(|e| FetchError::Content {
            url: url.clone(),
            reason: reason(e),
        })?;
        Ok(RenderedPage { url, html })
    }
}

impl PageFetcher for ChromeFetcher {
    fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<(), FetchError> {
        if cookies.is_empty() {
            return Ok(());
        }
        let params = cookies
            .iter()
            .map(cookie_param)
            .collect::<Result<Vec<_>, _>>()?;
        self.tab
            .set_cookies(params)
            .map_err(|e| FetchError::Cookies { reason: reason(e) })
    }

    fn navigate(&mut self, url: &str) -> Result<RenderedPage, FetchError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                reason: reason(e),
            })?;
        self.snapshot()
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<RenderedPage, FetchError> {
        // Never wait longer than a navigation is allowed to take.
        let timeout = timeout.min(self.navigation_timeout);
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| FetchError::ElementWait {
                url: self.current_url(),
                selector: selector.to_string(),
                timeout_secs: timeout.as_secs(),
                reason: reason(e),
            })?;
        self.snapshot()
    }
}

/// CDP cookie params have many optional fields; build from JSON so only name/value/domain are set.
fn cookie_param(cookie: &Cookie) -> Result<CookieParam, FetchError> {
    serde_json::from_value(serde_json::json!({
        "name": cookie.name,
        "value": cookie.value,
        "domain": cookie.domain,
    }))
    .map_err(|e| FetchError::Cookies {
        reason: format!("cookie '{}': {}", cookie.name, e),
    })
}

fn reason(e: anyhow::Error) -> String {
    format!("{:#}", e)
}

/// Builder for [ChromeFetcher]: headless toggle, window size, navigation timeout, browser binary.
#[derive(Debug)]
pub struct ChromeFetcherBuilder {
    headless: bool,
    window_size: (u32, u32),
    navigation_timeout_secs: u64,
    executable: Option<PathBuf>,
}

impl Default for ChromeFetcherBuilder {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: DEFAULT_WINDOW_SIZE,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            executable: None,
        }
    }
}

impl ChromeFetcherBuilder {
    /// Run without a visible window (default true).
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Default timeout for navigations and element waits, in seconds. Default 30.
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.navigation_timeout_secs = secs.max(1);
        self
    }

    /// Path to the Chrome/Chromium binary. If not set, the usual install locations are searched.
    pub fn executable(mut self, path: Option<PathBuf>) -> Self {
        self.executable = path;
        self
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Launch the browser and open the tab.
    pub fn build(self) -> Result<ChromeFetcher, FetchError> {
        let navigation_timeout = self.navigation_timeout();
        let options = LaunchOptions::default_builder()
            .headless(self.headless)
            .window_size(Some(self.window_size))
            .path(self.executable)
            .idle_browser_timeout(Duration::from_secs(IDLE_BROWSER_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Launch {
                reason: e.to_string(),
            })?;
        let browser = Browser::new(options).map_err(|e| FetchError::Launch { reason: reason(e) })?;
        let tab = browser
            .new_tab()
            .map_err(|e| FetchError::Launch { reason: reason(e) })?;
        tab.set_default_timeout(navigation_timeout);
        Ok(ChromeFetcher {
            _browser: browser,
            tab,
            navigation_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let b = ChromeFetcher::builder();
        assert!(b.headless);
        assert_eq!(b.window_size, (1080, 1024));
        assert_eq!(b.navigation_timeout(), Duration::from_secs(30));
        assert!(b.executable.is_none());
    }

    #[test]
    fn builder_clamps_zero_timeout() {
        let b = ChromeFetcher::builder().navigation_timeout_secs(0);
        assert_eq!(b.navigation_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn cookie_param_carries_name_value_domain() -> Result<(), FetchError> {
        let param = cookie_param(&Cookie {
            name: "session".to_string(),
            value: "abc=".to_string(),
            domain: "author.today".to_string(),
        })?;
        assert_eq!(param.name, "session");
        assert_eq!(param.value, "abc=");
        assert_eq!(param.domain.as_deref(), Some("author.today"));
        assert!(param.url.is_none());
        Ok(())
    }
}
