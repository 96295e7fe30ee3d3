//! Errors from the page fetcher and cookie parsing.

use thiserror::Error;

/// Failure talking to the browser or loading a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Could not launch the browser: {reason}")]
    Launch { reason: String },

    #[error("Could not set session cookies: {reason}")]
    Cookies { reason: String },

    #[error("Could not open {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element '{selector}' did not appear on {url} within {timeout_secs}s: {reason}")]
    ElementWait {
        url: String,
        selector: String,
        timeout_secs: u64,
        reason: String,
    },

    #[error("Could not read page content of {url}: {reason}")]
    Content { url: String, reason: String },
}

/// Malformed session cookie string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CookieParseError {
    #[error("Invalid cookie '{segment}': expected key=value (format: key1=val1;key2=val2)")]
    MissingEquals { segment: String },

    #[error("Invalid cookie '{segment}': cookie name is empty")]
    EmptyName { segment: String },
}
