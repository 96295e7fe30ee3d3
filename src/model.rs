//! Data model for a saved book.
//!
//! A book moves through three states: nothing fetched yet, listing extracted
//! ([BookInfo]), and chapters crawled ([CrawledBook]). Each pipeline stage takes
//! the state it needs, so "title and author are known" or "content has been
//! fetched" are properties of the type a stage receives.

use serde::{Deserialize, Serialize};

/// One row of the chapter listing, as extracted from the book page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterEntry {
    /// Display text of the row.
    pub label: String,
    /// Absolute URL of the chapter page. `None` when the row had no link (locked or paywalled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ChapterEntry {
    pub fn linked(label: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: Some(link.into()),
        }
    }

    pub fn unlinked(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.link.is_some()
    }
}

/// Book metadata plus the chapter listing in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
    pub chapters: Vec<ChapterEntry>,
}

/// A chapter after the crawl. `content` is `Some` exactly when the chapter had a link and was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Raw inner markup of the chapter's content region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A book whose available chapters have all been fetched. Chapter order is the listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawledBook {
    pub title: String,
    pub author: String,
    pub chapters: Vec<Chapter>,
}

impl CrawledBook {
    /// Number of chapters that carry content.
    pub fn fetched_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.content.is_some()).count()
    }
}

/// State-tagged book held by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Book {
    #[default]
    Empty,
    InfoFetched(BookInfo),
    Crawled(CrawledBook),
}

impl Book {
    pub fn title(&self) -> Option<&str> {
        match self {
            Book::Empty => None,
            Book::InfoFetched(info) => Some(&info.title),
            Book::Crawled(book) => Some(&book.title),
        }
    }

    pub fn author(&self) -> Option<&str> {
        match self {
            Book::Empty => None,
            Book::InfoFetched(info) => Some(&info.author),
            Book::Crawled(book) => Some(&book.author),
        }
    }

    pub fn chapter_count(&self) -> usize {
        match self {
            Book::Empty => 0,
            Book::InfoFetched(info) => info.chapters.len(),
            Book::Crawled(book) => book.chapters.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn sample_info() -> BookInfo {
        BookInfo {
            title: "Sample: Book".to_string(),
            author: "J. Doe".to_string(),
            chapters: vec![
                ChapterEntry::linked("Chapter 1", "https://author.today/reader/1/10"),
                ChapterEntry::unlinked("Chapter 2 (subscription)"),
            ],
        }
    }

    #[test]
    fn entry_availability_follows_link() {
        let info = sample_info();
        assert!(info.chapters[0].is_available());
        assert!(!info.chapters[1].is_available());
    }

    #[test]
    fn book_accessors_by_state() {
        let empty = Book::default();
        assert_eq!(empty.title(), None);
        assert_eq!(empty.author(), None);
        assert_eq!(empty.chapter_count(), 0);

        let fetched = Book::InfoFetched(sample_info());
        assert_eq!(fetched.title(), Some("Sample: Book"));
        assert_eq!(fetched.author(), Some("J. Doe"));
        assert_eq!(fetched.chapter_count(), 2);
    }

    #[test]
    fn crawled_book_counts_fetched_chapters() {
        let book = CrawledBook {
            title: "T".to_string(),
            author: "A".to_string(),
            chapters: vec![
                Chapter {
                    label: "1".to_string(),
                    link: Some("https://author.today/reader/1/10".to_string()),
                    content: Some("<h1>One</h1>".to_string()),
                },
                Chapter {
                    label: "2".to_string(),
                    link: None,
                    content: None,
                },
            ],
        };
        assert_eq!(book.fetched_count(), 1);
    }

    #[test]
    fn unlinked_entry_omits_link_in_json() -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string(&sample_info())?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        let chapters = value["chapters"]
            .as_array()
            .ok_or("chapters must be an array")?;
        assert_eq!(chapters.len(), 2);
        assert!(chapters[0].get("link").is_some());
        assert!(chapters[1].get("link").is_none());
        assert_eq!(chapters[1]["label"], "Chapter 2 (subscription)");
        Ok(())
    }
}
