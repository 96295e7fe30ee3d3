//! Interactive questions asked before the run, in a fixed order.
//!
//! Answers fill a [SettingsDraft]; only questions whose value is not already
//! known (from flags or the config file) are asked.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Could not read answer from terminal: {0}")]
    Terminal(#[from] dialoguer::Error),
}

/// Source of operator answers.
pub trait Prompter {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError>;

    /// Free-text answer; may be empty.
    fn text(&mut self, prompt: &str) -> Result<String, PromptError>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError> {
        (**self).confirm(prompt, default)
    }

    fn text(&mut self, prompt: &str) -> Result<String, PromptError> {
        (**self).text(prompt)
    }
}

/// Prompter on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn text(&mut self, prompt: &str) -> Result<String, PromptError> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }
}

pub const HEADLESS_PROMPT: &str = "Start the browser in windowless mode?";
pub const COOKIES_PROMPT: &str = "If necessary, insert a cookie (format: key1=val1;key2=val2)";
pub const URL_PROMPT: &str = "Enter the book address on author.today";
pub const OUTPUT_DIR_PROMPT: &str =
    "Specify the directory for saving the book (current directory if blank)";
pub const CONVERTER_PROMPT: &str =
    "Path to Calibre ebook-convert (leave blank to keep the book as HTML)";

/// Run settings collected from flags and config. `None` means "not decided yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDraft {
    pub headless: Option<bool>,
    pub cookies: Option<String>,
    pub url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub converter: Option<PathBuf>,
}

/// Final run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub headless: bool,
    /// Raw `key=value;...` string; parsed when the fetcher is set up.
    pub cookies: Option<String>,
    /// May be empty; the pipeline rejects it before launching anything.
    pub url: String,
    pub output_dir: PathBuf,
    pub converter: Option<PathBuf>,
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

impl SettingsDraft {
    /// Ask for every missing value in order (headless, cookies, URL, output
    /// directory, converter). Without a prompter, missing values take their defaults.
    pub fn complete(self, prompter: Option<&mut dyn Prompter>) -> Result<Settings, PromptError> {
        let Some(p) = prompter else {
            return Ok(Settings {
                headless: self.headless.unwrap_or(true),
                cookies: self.cookies.and_then(non_empty),
                url: self.url.unwrap_or_default(),
                output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
                converter: self.converter,
            });
        };

        let headless = match self.headless {
            Some(h) => h,
            None => p.confirm(HEADLESS_PROMPT, true)?,
        };
        let cookies = match self.cookies {
            Some(c) => non_empty(c),
            None => non_empty(p.text(COOKIES_PROMPT)?),
        };
        let url = match self.url {
            Some(u) => u,
            None => p.text(URL_PROMPT)?.trim().to_string(),
        };
        let output_dir = match self.output_dir {
            Some(d) => d,
            None => non_empty(p.text(OUTPUT_DIR_PROMPT)?)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let converter = match self.converter {
            Some(c) => Some(c),
            None => non_empty(p.text(CONVERTER_PROMPT)?).map(PathBuf::from),
        };

        Ok(Settings {
            headless,
            cookies,
            url,
            output_dir,
            converter,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Answer {
        Confirm(bool),
        Text(String),
    }

    /// Replays canned answers and records the questions asked.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedPrompter {
        answers: VecDeque<Answer>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: answers.into(),
                asked: Vec::new(),
            }
        }

        fn next(&mut self, prompt: &str) -> Result<Answer, PromptError> {
            self.asked.push(prompt.to_string());
            self.answers.pop_front().ok_or_else(|| {
                PromptError::Terminal(dialoguer::Error::IO(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("no scripted answer for {:?}", prompt),
                )))
            })
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError> {
            match self.next(prompt)? {
                Answer::Confirm(b) => Ok(b),
                Answer::Text(t) if t.is_empty() => Ok(default),
                Answer::Text(t) => Ok(t.eq_ignore_ascii_case("y")),
            }
        }

        fn text(&mut self, prompt: &str) -> Result<String, PromptError> {
            match self.next(prompt)? {
                Answer::Text(t) => Ok(t),
                Answer::Confirm(b) => Ok(if b { "y" } else { "n" }.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Answer, ScriptedPrompter};
    use super::*;

    fn text(s: &str) -> Answer {
        Answer::Text(s.to_string())
    }

    #[test]
    fn asks_everything_in_order_when_nothing_known() -> Result<(), PromptError> {
        let mut p = ScriptedPrompter::new(vec![
            Answer::Confirm(false),
            text("a=1;b=2"),
            text(" https://author.today/work/1 "),
            text("books"),
            text("/opt/calibre/ebook-convert"),
        ]);
        let settings = SettingsDraft::default().complete(Some(&mut p))?;
        assert_eq!(
            p.asked,
            vec![
                HEADLESS_PROMPT,
                COOKIES_PROMPT,
                URL_PROMPT,
                OUTPUT_DIR_PROMPT,
                CONVERTER_PROMPT
            ]
        );
        assert_eq!(
            settings,
            Settings {
                headless: false,
                cookies: Some("a=1;b=2".to_string()),
                url: "https://author.today/work/1".to_string(),
                output_dir: PathBuf::from("books"),
                converter: Some(PathBuf::from("/opt/calibre/ebook-convert")),
            }
        );
        Ok(())
    }

    #[test]
    fn known_values_are_not_asked() -> Result<(), PromptError> {
        let mut p = ScriptedPrompter::new(vec![text(""), text("")]);
        let draft = SettingsDraft {
            headless: Some(true),
            url: Some("https://author.today/work/1".to_string()),
            output_dir: Some(PathBuf::from("out")),
            ..Default::default()
        };
        let settings = draft.complete(Some(&mut p))?;
        assert_eq!(p.asked, vec![COOKIES_PROMPT, CONVERTER_PROMPT]);
        assert!(settings.cookies.is_none());
        assert!(settings.converter.is_none());
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        Ok(())
    }

    #[test]
    fn blank_answers_take_defaults() -> Result<(), PromptError> {
        let mut p = ScriptedPrompter::new(vec![text(""), text("  "), text(""), text(""), text("")]);
        let settings = SettingsDraft::default().complete(Some(&mut p))?;
        assert!(settings.headless);
        assert!(settings.cookies.is_none());
        assert_eq!(settings.url, "");
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert!(settings.converter.is_none());
        Ok(())
    }

    #[test]
    fn no_prompter_uses_defaults() -> Result<(), PromptError> {
        let settings = SettingsDraft {
            cookies: Some("  ".to_string()),
            ..Default::default()
        }
        .complete(None)?;
        assert!(settings.headless);
        assert!(settings.cookies.is_none());
        assert_eq!(settings.url, "");
        assert_eq!(settings.output_dir, PathBuf::from("."));
        Ok(())
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = ScriptedPrompter::new(vec![]);
        assert!(SettingsDraft::default().complete(Some(&mut p)).is_err());
    }
}
