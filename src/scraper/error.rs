//! Error type for extracting the book listing and crawling chapters.

use crate::fetch::FetchError;
use thiserror::Error;

/// Scrape failures. Each variant tells the operator whether the URL was wrong,
/// the site failed to render or changed, or a chapter could not be loaded.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("No book URL given. Enter the address of a book on author.today.")]
    EmptyUrl,

    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("{url} is not a book page. Paste the URL of the book, not the URL of one of its chapters.")]
    NotABookPage { url: String },

    #[error("Could not load the book page {url}: {source}")]
    BookPage {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Book page {url} has a title but no author (the page may not have rendered, or the site layout changed).")]
    MissingAuthor { url: String },

    #[error("Book page {url} has no chapter list (the page may not have rendered, or the site layout changed).")]
    ChapterListMissing { url: String },

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Could not fetch chapter {index} ({label}) at {url}: {source}")]
    ChapterFetch {
        index: usize,
        label: String,
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Chapter {index} ({label}) at {url} has no content region.")]
    ChapterContentMissing {
        index: usize,
        label: String,
        url: String,
    },
}
