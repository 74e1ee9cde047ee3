use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use super::sink::Sink;
use super::walker::Walker;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::metrics::StatsSnapshot;

/// Searches the configured directory tree, reporting each file to `sink`.
///
/// Validates the configuration first: an empty search text or a root that cannot be
/// listed fails before anything is scanned. Per-file and per-directory failures during
/// the walk go to the sink and do not fail the search.
pub fn search<S>(config: &SearchConfig, sink: &S) -> SearchResult<StatsSnapshot>
where
    S: Sink + ?Sized,
{
    info!(
        "Starting search for {:?} in {}",
        config.search_text,
        config.root_path.display()
    );
    config.validate()?;

    let thread_count = config.thread_count.get();
    debug!("Using {} worker threads", thread_count);
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .thread_name(|i| format!("grip-worker-{}", i))
        .build()
        .map_err(|e| SearchError::config_error(format!("failed to start worker pool: {}", e)))?;

    let walker = Walker::new(&config.root_path, config.walk_options());
    pool.install(|| walker.walk(&config.search_text, sink));

    walker.stats().log_stats();
    let stats = walker.stats().snapshot();
    info!(
        "Search complete. Found {} matches in {} files",
        stats.total_matches, stats.files_with_matches
    );

    Ok(stats)
}
