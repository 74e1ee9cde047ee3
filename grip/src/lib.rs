//! Recursive, concurrent substring search over a directory tree.
//!
//! ```rust,no_run
//! use grip::{search, CollectingSink, SearchConfig};
//!
//! let config = SearchConfig::new("hello", ".");
//! let sink = CollectingSink::new();
//! let stats = search(&config, &sink)?;
//! println!("{} matches in {} files", stats.total_matches, stats.files_with_matches);
//! # Ok::<(), grip::SearchError>(())
//! ```
pub mod config;
pub mod errors;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{ConfigOverrides, EncodingMode, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use metrics::{SearchStats, StatsSnapshot};
pub use results::{FileResult, Match, ScanOutcome};
pub use search::{search, CollectingSink, Scanner, Sink, WalkOptions, Walker};
