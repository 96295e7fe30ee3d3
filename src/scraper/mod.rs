//! Book listing extraction, availability classification, and the chapter crawl.

mod availability;
mod crawl;
mod error;
mod extract;

pub use availability::{classify, Availability};
pub use crawl::{crawl_book, CrawlOptions};
pub use error::ScraperError;
pub use extract::{extract_book_info, extract_chapter_content};

use scraper::Selector;
use url::Url;

/// CSS selectors and constants describing the target site's markup.
///
/// [SiteProfile::default] is the author.today layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    /// Present only on a book listing page; its text is the title.
    pub book_title: String,
    pub book_authors: String,
    pub chapter_list: String,
    /// One element per listing row, in listing order.
    pub chapter_rows: String,
    /// Navigable link inside a row. Rows without one are unavailable.
    pub row_link: String,
    /// Region of a chapter page whose inner markup is captured.
    pub content_region: String,
    /// Appears once the content region has finished its asynchronous render.
    pub content_ready: String,
    /// Domain attached to session cookies.
    pub cookie_domain: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            book_title: ".book-title".to_string(),
            book_authors: ".book-authors".to_string(),
            chapter_list: "#tab-chapters".to_string(),
            chapter_rows: "#tab-chapters li".to_string(),
            row_link: "a[href]".to_string(),
            content_region: "#text-container".to_string(),
            content_ready: "#text-container h1".to_string(),
            cookie_domain: "author.today".to_string(),
        }
    }
}

/// Parse a CSS selector or return an error (avoids panics from Selector::parse).
pub(crate) fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::InvalidSelector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Check the entry URL before anything is launched. Empty input and unparseable URLs are rejected.
pub fn validate_entry_url(input: &str) -> Result<Url, ScraperError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ScraperError::EmptyUrl);
    }
    let url = Url::parse(input).map_err(|e| ScraperError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScraperError::InvalidUrl {
            input: input.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_selectors_parse() -> Result<(), ScraperError> {
        let p = SiteProfile::default();
        for sel in [
            &p.book_title,
            &p.book_authors,
            &p.chapter_list,
            &p.chapter_rows,
            &p.row_link,
            &p.content_region,
            &p.content_ready,
        ] {
            parse_selector(sel)?;
        }
        Ok(())
    }

    #[test]
    fn invalid_selector_errors() {
        assert!(matches!(
            parse_selector("div[["),
            Err(ScraperError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn entry_url_empty_errors() {
        assert!(matches!(validate_entry_url(""), Err(ScraperError::EmptyUrl)));
        assert!(matches!(
            validate_entry_url("   "),
            Err(ScraperError::EmptyUrl)
        ));
    }

    #[test]
    fn entry_url_unparseable_errors() -> Result<(), String> {
        match validate_entry_url("not-a-url") {
            Err(ScraperError::InvalidUrl { input, .. }) if input == "not-a-url" => Ok(()),
            other => Err(format!("expected InvalidUrl, got {:?}", other)),
        }
    }

    #[test]
    fn entry_url_rejects_non_http_scheme() {
        assert!(matches!(
            validate_entry_url("file:///etc/passwd"),
            Err(ScraperError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn entry_url_accepts_book_url() -> Result<(), ScraperError> {
        let url = validate_entry_url(" https://author.today/work/12345 ")?;
        assert_eq!(url.host_str(), Some("author.today"));
        assert_eq!(url.path(), "/work/12345");
        Ok(())
    }
}
