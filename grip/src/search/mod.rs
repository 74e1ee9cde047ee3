/// Concurrent directory walking and file scanning.
///
/// # How a search runs
///
/// [`Walker::walk`] lists one directory and splits its entries into files and
/// subdirectories. Inside a [`rayon::scope`] it spawns one task per file, each running the
/// [`Scanner`] and handing the outcome to the [`Sink`], and one task per subdirectory, each
/// running a child walker with the same options. The scope only returns once every task it
/// spawned, and everything those tasks spawned in turn, has finished:
///
/// ```text
/// walk(root)
///  ├── scan(root/a.txt)      ──► sink
///  ├── scan(root/.env)       ──► sink
///  └── walk(root/sub)
///       └── scan(root/sub/b.txt) ──► sink
/// ```
///
/// [`search`] wraps this in a dedicated thread pool of `thread_count` workers, so the
/// number of tasks running at once is bounded even though every entry gets its own task.
/// Scopes that are waiting on children steal queued work, so nested scopes cannot starve
/// the pool.
///
/// # Ordering
///
/// Outcomes reach the sink in completion order, which varies from run to run. Within one
/// file, matches are always in line order.
pub mod engine;
pub mod scanner;
pub mod sink;
pub mod walker;

pub use engine::search;
pub use scanner::Scanner;
pub use sink::{CollectingSink, Sink};
pub use walker::{WalkOptions, Walker};
