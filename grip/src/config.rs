use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{SearchError, SearchResult};
use crate::search::WalkOptions;

/// Configuration for a search.
///
/// # Configuration Locations
///
/// Settings are read from these files, later ones overriding earlier ones:
/// 1. Global `$CONFIG_DIR/grip/config.yaml` (e.g. `~/.config/grip/config.yaml`)
/// 2. Local `.grip.yaml` in the current directory
/// 3. A file passed explicitly with `--config`
///
/// Command-line values are applied last with [`SearchConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Descend into directories whose name starts with '.'
/// include_hidden: false
///
/// # Print a summary after the walk
/// verbose: false
///
/// # Worker threads (default: CPU cores)
/// thread_count: 4
///
/// # How to treat invalid UTF-8 (lossy, failfast)
/// encoding_mode: lossy
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
///
/// `search_text` and `root_path` may be set too, but normally come from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Literal, case-sensitive text to look for
    pub search_text: String,

    /// Directory the walk starts from
    pub root_path: PathBuf,

    /// Whether hidden directories are descended into.
    /// Hidden files are scanned either way.
    pub include_hidden: bool,

    /// Whether to report a summary once the walk completes
    pub verbose: bool,

    /// Number of worker threads; bounds how many scans and listings run at once
    pub thread_count: NonZeroUsize,

    /// How to handle invalid UTF-8 sequences
    pub encoding_mode: EncodingMode,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            root_path: PathBuf::from("."),
            include_hidden: false,
            verbose: false,
            thread_count: default_thread_count(),
            encoding_mode: EncodingMode::default(),
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line; `None` leaves the file value alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub search_text: Option<String>,
    pub root_path: Option<PathBuf>,
    pub include_hidden: bool,
    pub verbose: bool,
    pub thread_count: Option<NonZeroUsize>,
    pub encoding_mode: Option<EncodingMode>,
    pub log_level: Option<String>,
}

impl SearchConfig {
    /// Creates a configuration with defaults for everything but the request itself
    pub fn new(search_text: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            search_text: search_text.into(),
            root_path: root_path.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations plus an explicit file.
    ///
    /// The default locations are optional; an explicit file must exist.
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("grip/config.yaml")),
            Some(PathBuf::from(".grip.yaml")),
        ];
        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges command-line values over configuration file values
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(search_text) = cli.search_text {
            self.search_text = search_text;
        }
        if let Some(root_path) = cli.root_path {
            self.root_path = root_path;
        }
        if cli.include_hidden {
            self.include_hidden = true;
        }
        if cli.verbose {
            self.verbose = true;
        }
        if let Some(thread_count) = cli.thread_count {
            self.thread_count = thread_count;
        }
        if let Some(encoding_mode) = cli.encoding_mode {
            self.encoding_mode = encoding_mode;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Checks that a search can run: non-empty search text and a listable root.
    pub fn validate(&self) -> SearchResult<()> {
        if self.search_text.is_empty() {
            return Err(SearchError::config_error("search text must not be empty"));
        }
        std::fs::read_dir(&self.root_path)
            .map_err(|e| SearchError::invalid_directory(&self.root_path, e))?;
        Ok(())
    }

    /// Options every walker of this search shares
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            include_hidden: self.include_hidden,
            encoding_mode: self.encoding_mode,
        }
    }
}

/// How invalid UTF-8 in a scanned file is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Replace invalid sequences with U+FFFD and keep scanning
    #[default]
    Lossy,
    /// Give up on the file at the first invalid line
    FailFast,
}

impl FromStr for EncodingMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lossy" => Ok(Self::Lossy),
            "failfast" => Ok(Self::FailFast),
            other => Err(SearchError::config_error(format!(
                "unknown encoding mode '{}' (expected lossy or failfast)",
                other
            ))),
        }
    }
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lossy => f.write_str("lossy"),
            Self::FailFast => f.write_str("failfast"),
        }
    }
}
