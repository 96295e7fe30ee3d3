//! atsaver: save a book from author.today as one HTML document, optionally converted with Calibre.

pub mod cli;
pub mod config;
pub mod convert;
pub mod document;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use document::{assemble, write_document, Document, DocumentError};
pub use fetch::{ChromeFetcher, ChromeFetcherBuilder, FetchError, PageFetcher, RenderedPage};
pub use model::{Book, BookInfo, Chapter, ChapterEntry, CrawledBook};
pub use pipeline::{
    run_pipeline, Operator, Outcome, PipelineError, PipelineSettings, Progress, Stage,
};
pub use scraper::{ScraperError, SiteProfile};
