//! Optional config file loading. Search order: ./atsaver.toml, then
//! $XDG_CONFIG_HOME/atsaver/config.toml (or ~/.config/atsaver/config.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Config {
    /// Directory the book is saved into when -o is not set. Relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// Run the browser without a window (default true).
    pub headless: Option<bool>,
    /// Session cookie string, `key1=val1;key2=val2`.
    pub cookies: Option<String>,
    /// Domain the session cookies are set for (default author.today).
    pub cookie_domain: Option<String>,
    /// Path to Calibre's ebook-convert. When set, the saved book is converted.
    pub converter: Option<PathBuf>,
    /// Target extension for conversion (default fb2).
    pub convert_format: Option<String>,
    /// Seconds to wait for a page or a chapter's text to render (default 30).
    pub timeout_secs: Option<u64>,
    /// Chrome/Chromium binary to launch instead of the auto-detected one.
    pub chrome_path: Option<PathBuf>,
}

/// Search order: (1) ./atsaver.toml, (2) $XDG_CONFIG_HOME/atsaver/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("atsaver.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("atsaver").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            return load_config_from(path).map(Some);
        }
    }
    Ok(None)
}

/// Read and parse one config file.
pub fn load_config_from(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    let config: Config =
        toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
