//! CLI parsing and orchestration. Merges flags, config file and prompts, launches the
//! browser, runs the save pipeline and maps errors to exit codes.

use crate::config::{self, Config};
use crate::convert::{ConversionOutput, ConvertError, DEFAULT_CONVERT_EXTENSION};
use crate::document::DocumentError;
use crate::fetch::ChromeFetcher;
use crate::pipeline::{
    run_pipeline, AskOperator, Operator, Outcome, PartialPolicy, PipelineError, PipelineSettings,
    Preview, Progress,
};
use crate::prompt::{PromptError, Prompter, SettingsDraft, TerminalPrompter};
use crate::scraper::{validate_entry_url, ScraperError, SiteProfile};
use clap::{ArgAction, Parser};
use std::cell::RefCell;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Book saved to {}, but conversion failed: {source}", .document.display())]
    Conversion {
        document: PathBuf,
        #[source]
        source: ConvertError,
    },
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) | CliRunError::Prompt(_) => 1,
            CliRunError::Pipeline(e) => match e {
                PipelineError::Scraper(ScraperError::EmptyUrl)
                | PipelineError::Scraper(ScraperError::InvalidUrl { .. })
                | PipelineError::Cookies(_)
                | PipelineError::Prompt(_) => 1,
                PipelineError::Scraper(_)
                | PipelineError::Fetch(_)
                | PipelineError::IllegalTransition { .. } => 2,
                PipelineError::Document(_) => 3,
            },
            CliRunError::Conversion { .. } => 4,
        }
    }
}

impl From<ScraperError> for CliRunError {
    fn from(e: ScraperError) -> Self {
        CliRunError::Pipeline(PipelineError::Scraper(e))
    }
}

impl From<DocumentError> for CliRunError {
    fn from(e: DocumentError) -> Self {
        CliRunError::Pipeline(PipelineError::Document(e))
    }
}

#[derive(Parser, Debug)]
#[command(name = "atsaver")]
#[command(about = "Save a book from author.today as a single HTML document, optionally converted with Calibre")]
#[command(
    after_help = "Config file keys (output_dir, headless, cookies, cookie_domain, converter, convert_format, timeout_secs, chrome_path) are read from ./atsaver.toml or <config dir>/atsaver/config.toml. CLI flags override config; anything still missing is asked interactively."
)]
pub struct Args {
    /// Book URL, e.g. https://author.today/work/12345. Asked for when omitted.
    pub url: Option<String>,

    /// Directory to save the book into. Default: current directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Session cookies, format: key1=val1;key2=val2.
    #[arg(long)]
    pub cookies: Option<String>,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    pub show_browser: bool,

    /// Save only the available chapters without asking when some are locked.
    #[arg(long)]
    pub allow_partial: bool,

    /// Path to Calibre's ebook-convert. The saved book is converted when set.
    #[arg(long)]
    pub converter: Option<PathBuf>,

    /// Target format for conversion (default fb2).
    #[arg(long)]
    pub convert_format: Option<String>,

    /// Seconds to wait for a page or chapter text to render (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Chrome/Chromium executable to launch.
    #[arg(long)]
    pub chrome: Option<PathBuf>,

    /// Fetch the chapter list only, print counts and output path without writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; missing values take their defaults.
    #[arg(long)]
    pub no_input: bool,

    /// Errors only, no progress bar.
    #[arg(short, long)]
    pub quiet: bool,

    /// More log output (-v debug, -vv trace) and the full error chain on failure.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Values known before any prompt: flags first, then the config file.
fn settings_draft(args: &Args, config: Option<&Config>) -> SettingsDraft {
    let headless = if args.show_browser {
        Some(false)
    } else {
        config.and_then(|c| c.headless)
    };
    SettingsDraft {
        headless,
        cookies: args
            .cookies
            .clone()
            .or_else(|| config.and_then(|c| c.cookies.clone())),
        url: args.url.clone(),
        output_dir: args
            .output
            .clone()
            .or_else(|| config.and_then(|c| c.output_dir.clone())),
        converter: args
            .converter
            .clone()
            .or_else(|| config.and_then(|c| c.converter.clone())),
    }
}

fn site_profile(config: Option<&Config>) -> SiteProfile {
    let mut profile = SiteProfile::default();
    if let Some(domain) = config.and_then(|c| c.cookie_domain.clone()) {
        profile.cookie_domain = domain;
    }
    profile
}

fn convert_extension(args: &Args, config: Option<&Config>) -> String {
    args.convert_format
        .clone()
        .or_else(|| config.and_then(|c| c.convert_format.clone()))
        .map(|ext| ext.trim().trim_start_matches('.').to_string())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| DEFAULT_CONVERT_EXTENSION.to_string())
}

/// Ensure the output directory exists before the browser is started.
fn validate_output_dir(dir: &Path) -> Result<(), DocumentError> {
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        return Err(DocumentError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Chapter progress bar, created on the first chapter and cleared when the crawl ends.
#[derive(Default)]
struct ChapterBar {
    state: RefCell<Option<indicatif::ProgressBar>>,
}

impl Progress for ChapterBar {
    fn chapter(&self, n: u32, total: u32) {
        if total == 0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total as u64);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                        .progress_chars("█▉▊▋▌▍▎▏ "),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(n as u64);
        pb.set_message(format!("Fetching chapter {}/{}", n, total));
    }

    fn finish(&self) {
        if let Some(pb) = self.state.borrow_mut().take() {
            pb.disable_steady_tick();
            pb.finish_and_clear();
        }
    }
}

fn print_preview(preview: &Preview) {
    eprintln!("Title: {}", preview.title);
    eprintln!("Author: {}", preview.author);
    eprintln!(
        "Chapters: {} ({} available)",
        preview.availability.total, preview.availability.available
    );
    eprintln!("Output: {}", preview.output_path.display());
}

fn log_converter_output(output: &ConversionOutput) {
    for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
        tracing::info!(target: "atsaver::converter", "{}", line);
    }
    for line in output.stderr.lines().filter(|l| !l.trim().is_empty()) {
        tracing::warn!(target: "atsaver::converter", "{}", line);
    }
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let config = config.as_ref();

    let interactive = !args.no_input && std::io::stdin().is_terminal();
    let mut terminal = interactive.then(TerminalPrompter::new);
    let draft = settings_draft(args, config);
    let settings = draft.complete(terminal.as_mut().map(|p| p as &mut dyn Prompter))?;

    validate_entry_url(&settings.url)?;
    if !args.dry_run {
        validate_output_dir(&settings.output_dir)?;
    }

    let timeout_secs = args
        .timeout
        .or_else(|| config.and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let chrome_path = args
        .chrome
        .clone()
        .or_else(|| config.and_then(|c| c.chrome_path.clone()));

    let mut fetcher = ChromeFetcher::builder()
        .headless(settings.headless)
        .navigation_timeout_secs(timeout_secs)
        .executable(chrome_path)
        .build()
        .map_err(PipelineError::from)?;

    let mut operator: Box<dyn Operator> = match terminal {
        Some(prompter) if !args.allow_partial => Box::new(AskOperator(prompter)),
        _ if args.allow_partial => Box::new(PartialPolicy::Accept),
        _ => Box::new(PartialPolicy::Decline),
    };

    let pipeline_settings = PipelineSettings {
        entry_url: settings.url,
        cookies: settings.cookies,
        output_dir: settings.output_dir,
        converter: settings.converter,
        convert_extension: convert_extension(args, config),
        content_timeout: Duration::from_secs(timeout_secs),
        dry_run: args.dry_run,
    };

    let bar = ChapterBar::default();
    let progress: Option<&dyn Progress> = if args.quiet { None } else { Some(&bar) };

    let profile = site_profile(config);
    let result = run_pipeline(
        &mut fetcher,
        operator.as_mut(),
        &profile,
        &pipeline_settings,
        progress,
    );

    bar.finish();

    match result? {
        Outcome::Previewed(preview) => print_preview(&preview),
        Outcome::Aborted(_) => {
            if !args.quiet {
                eprintln!("Save cancelled.");
            }
        }
        Outcome::Done {
            document,
            conversion_error: None,
        } => {
            if !args.quiet {
                eprintln!("Wrote {}", document.display());
            }
        }
        Outcome::Done {
            document,
            conversion_error: Some(source),
        } => {
            if let ConvertError::Failed { output, .. } = &source {
                log_converter_output(output);
            }
            return Err(CliRunError::Conversion { document, source });
        }
        Outcome::Converted {
            document,
            converted,
            output,
        } => {
            log_converter_output(&output);
            if !args.quiet {
                eprintln!("Wrote {}", document.display());
                eprintln!("Converted {}", converted.display());
            }
        }
    }
    Ok(())
}
