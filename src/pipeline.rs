//! The save pipeline: fetch listing, classify, crawl, assemble, convert.
//!
//! ```text
//! Init -> InfoFetched -> Crawling -> Assembled -> Done
//!              |                          \-> Converted
//!              \-> Aborted
//! ```
//!
//! The operator is consulted once, after the listing is fetched and only when
//! some chapters have no link. Everything after that runs without further gating.

use crate::convert::{self, ConversionOutput, ConvertError};
use crate::document::{self, DocumentError};
use crate::fetch::{parse_cookie_string, CookieParseError, FetchError, PageFetcher};
use crate::model::{Book, BookInfo, CrawledBook};
use crate::prompt::{PromptError, Prompter};
use crate::scraper::{
    classify, crawl_book, extract_book_info, validate_entry_url, Availability, CrawlOptions,
    ScraperError, SiteProfile,
};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    InfoFetched,
    Crawling,
    Assembled,
    Aborted,
    Converted,
    Done,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Aborted | Stage::Converted | Stage::Done)
    }

    /// Legal transitions of the state machine.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Init, InfoFetched)
                | (Init, Aborted)
                | (InfoFetched, Aborted)
                | (InfoFetched, Crawling)
                | (Crawling, Assembled)
                | (Assembled, Converted)
                | (Assembled, Done)
        )
    }
}

/// Decides whether to go on when only part of the book can be downloaded.
pub trait Operator {
    fn accept_partial(&mut self, availability: &Availability) -> Result<bool, PromptError>;
}

/// Fixed answer, for non-interactive runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialPolicy {
    Accept,
    Decline,
}

impl Operator for PartialPolicy {
    fn accept_partial(&mut self, _availability: &Availability) -> Result<bool, PromptError> {
        Ok(*self == PartialPolicy::Accept)
    }
}

/// Asks through a [Prompter]; the default answer is "no".
pub struct AskOperator<P: Prompter>(pub P);

impl<P: Prompter> Operator for AskOperator<P> {
    fn accept_partial(&mut self, availability: &Availability) -> Result<bool, PromptError> {
        let prompt = format!(
            "Not all chapters are available for download ({} of {}). Download only the available ones?",
            availability.available, availability.total
        );
        self.0.confirm(&prompt, false)
    }
}

/// Chapter progress of the crawl stage.
pub trait Progress {
    /// Called before each chapter fetch with (chapter number, chapters to fetch).
    fn chapter(&self, n: u32, total: u32);

    /// Called once when the crawl ends, successfully or not, before anything is written.
    fn finish(&self) {}
}

/// Everything the pipeline needs besides the fetcher and the operator.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub entry_url: String,
    /// Raw `key=value;...` session cookie string.
    pub cookies: Option<String>,
    pub output_dir: PathBuf,
    pub converter: Option<PathBuf>,
    /// Extension of the converted file.
    pub convert_extension: String,
    pub content_timeout: Duration,
    /// Stop after the availability report; write nothing.
    pub dry_run: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            entry_url: String::new(),
            cookies: None,
            output_dir: PathBuf::from("."),
            converter: None,
            convert_extension: convert::DEFAULT_CONVERT_EXTENSION.to_string(),
            content_timeout: Duration::from_secs(30),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Some chapters are locked and the operator chose not to save a partial book.
    PartialDeclined,
}

/// What a dry run would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub title: String,
    pub author: String,
    pub availability: Availability,
    pub output_path: PathBuf,
}

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    Aborted(AbortReason),
    Previewed(Preview),
    /// Document written. `conversion_error` is set when a converter was given but failed.
    Done {
        document: PathBuf,
        conversion_error: Option<ConvertError>,
    },
    Converted {
        document: PathBuf,
        converted: PathBuf,
        output: ConversionOutput,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error("Invalid session cookie: {0}")]
    Cookies(#[from] CookieParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Internal error: illegal pipeline transition {from:?} -> {to:?}")]
    IllegalTransition { from: Stage, to: Stage },
}

/// Stage plus the book in the state that stage implies.
struct Machine {
    stage: Stage,
    book: Book,
}

impl Machine {
    fn new() -> Self {
        Self {
            stage: Stage::Init,
            book: Book::Empty,
        }
    }

    fn advance(&mut self, next: Stage) -> Result<(), PipelineError> {
        if !self.stage.can_advance_to(next) {
            return Err(PipelineError::IllegalTransition {
                from: self.stage,
                to: next,
            });
        }
        tracing::debug!(
            from = ?self.stage,
            to = ?next,
            title = self.book.title().unwrap_or_default(),
            chapters = self.book.chapter_count(),
            "pipeline stage"
        );
        self.stage = next;
        Ok(())
    }

    fn info_fetched(&mut self, info: BookInfo) -> Result<(), PipelineError> {
        self.advance(Stage::InfoFetched)?;
        self.book = Book::InfoFetched(info);
        Ok(())
    }

    /// Enter Crawling and hand out the listing to crawl.
    fn start_crawl(&mut self) -> Result<BookInfo, PipelineError> {
        let from = self.stage;
        self.advance(Stage::Crawling)?;
        match std::mem::take(&mut self.book) {
            Book::InfoFetched(info) => Ok(info),
            other => {
                self.book = other;
                Err(PipelineError::IllegalTransition {
                    from,
                    to: Stage::Crawling,
                })
            }
        }
    }

    fn assembled(&mut self, book: CrawledBook) -> Result<(), PipelineError> {
        self.advance(Stage::Assembled)?;
        self.book = Book::Crawled(book);
        Ok(())
    }
}

/// Run one save from entry URL to written (and optionally converted) document.
///
/// `fetcher` is borrowed for the whole run; chapter pages are loaded one after
/// another on it. Any chapter failure aborts the run before anything is written.
pub fn run_pipeline<F, O>(
    fetcher: &mut F,
    operator: &mut O,
    profile: &SiteProfile,
    settings: &PipelineSettings,
    progress: Option<&dyn Progress>,
) -> Result<Outcome, PipelineError>
where
    F: PageFetcher + ?Sized,
    O: Operator + ?Sized,
{
    let mut machine = Machine::new();
    run_stages(&mut machine, fetcher, operator, profile, settings, progress)
}

/// Validate the entry URL, install cookies and extract the listing.
fn open_book<F>(
    fetcher: &mut F,
    profile: &SiteProfile,
    settings: &PipelineSettings,
) -> Result<BookInfo, PipelineError>
where
    F: PageFetcher + ?Sized,
{
    let entry = validate_entry_url(&settings.entry_url)?;
    if let Some(raw) = settings.cookies.as_deref() {
        let cookies = parse_cookie_string(raw, &profile.cookie_domain)?;
        tracing::debug!(count = cookies.len(), "installing session cookies");
        fetcher.set_cookies(&cookies)?;
    }

    tracing::info!(url = %entry, "open book");
    let page = fetcher
        .navigate(entry.as_str())
        .map_err(|source| ScraperError::BookPage {
            url: entry.to_string(),
            source,
        })?;
    Ok(extract_book_info(&page, profile)?)
}

fn run_stages<F, O>(
    machine: &mut Machine,
    fetcher: &mut F,
    operator: &mut O,
    profile: &SiteProfile,
    settings: &PipelineSettings,
    progress: Option<&dyn Progress>,
) -> Result<Outcome, PipelineError>
where
    F: PageFetcher + ?Sized,
    O: Operator + ?Sized,
{
    let info = match open_book(fetcher, profile, settings) {
        Ok(info) => info,
        Err(e) => {
            machine.advance(Stage::Aborted)?;
            return Err(e);
        }
    };
    let availability = classify(&info.chapters);
    tracing::info!(
        title = %info.title,
        author = %info.author,
        chapters = availability.total,
        available = availability.available,
        "book found"
    );
    let preview = settings.dry_run.then(|| Preview {
        title: info.title.clone(),
        author: info.author.clone(),
        availability,
        output_path: settings.output_dir.join(format!(
            "{}.{}",
            document::file_stem(&info.author, &info.title),
            document::DOCUMENT_EXTENSION
        )),
    });
    machine.info_fetched(info)?;
    if let Some(preview) = preview {
        // A dry run stops before the crawl, like a declined partial download.
        machine.advance(Stage::Aborted)?;
        return Ok(Outcome::Previewed(preview));
    }

    if !availability.all_available() {
        tracing::warn!(
            unavailable = availability.unavailable(),
            total = availability.total,
            "not all chapters are available for download"
        );
        if !operator.accept_partial(&availability)? {
            machine.advance(Stage::Aborted)?;
            tracing::warn!("save cancelled");
            return Ok(Outcome::Aborted(AbortReason::PartialDeclined));
        }
    }

    let info = machine.start_crawl()?;
    let report = progress.map(|p| move |n: u32, total: u32| p.chapter(n, total));
    let crawled = crawl_book(
        fetcher,
        profile,
        info,
        &CrawlOptions {
            content_timeout: settings.content_timeout,
            progress: report.as_ref().map(|f| f as &dyn Fn(u32, u32)),
        },
    );
    if let Some(p) = progress {
        p.finish();
    }
    let crawled = crawled?;
    let fetched = crawled.fetched_count();
    let doc = document::assemble(&crawled)?;
    let document_path = document::write_document(&doc, &settings.output_dir)?;
    machine.assembled(crawled)?;
    tracing::info!(
        title = machine.book.title().unwrap_or_default(),
        author = machine.book.author().unwrap_or_default(),
        chapters = machine.book.chapter_count(),
        fetched,
        "book assembled"
    );

    let Some(converter) = settings.converter.as_deref() else {
        machine.advance(Stage::Done)?;
        return Ok(Outcome::Done {
            document: document_path,
            conversion_error: None,
        });
    };

    let converted = settings
        .output_dir
        .join(doc.file_name_with_extension(&settings.convert_extension));
    match convert::invoke(converter, &document_path, &converted) {
        Ok(output) => {
            machine.advance(Stage::Converted)?;
            Ok(Outcome::Converted {
                document: document_path,
                converted,
                output,
            })
        }
        Err(e) => {
            tracing::error!(error = %e, document = %document_path.display(), "conversion failed, HTML document kept");
            machine.advance(Stage::Done)?;
            Ok(Outcome::Done {
                document: document_path,
                conversion_error: Some(e),
            })
        }
    }
}
