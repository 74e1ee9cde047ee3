use colored::Colorize;
use grip::{FileResult, ScanOutcome, SearchError, Sink, StatsSnapshot};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::debug;

/// Prints matching files as they complete.
///
/// Each file is written as one block under a lock, so concurrent files never interleave.
/// Failures go to stderr.
pub struct Printer<W: Write + Send> {
    out: Mutex<W>,
}

impl Printer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Printer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_block(&self, block: &str) -> io::Result<()> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        out.write_all(block.as_bytes())?;
        out.flush()
    }

    /// Writes the summary printed in verbose mode
    pub fn print_summary(&self, stats: &StatsSnapshot) -> io::Result<()> {
        self.write_block(&format!("\n{}\n", summary_line(stats)))
    }
}

impl<W: Write + Send> Sink for Printer<W> {
    fn on_file(&self, outcome: ScanOutcome) {
        match outcome {
            Ok(file) if file.has_matches() => {
                if let Err(e) = self.write_block(&render_file(&file)) {
                    debug!("Failed to write results for {}: {}", file.path.display(), e);
                }
            }
            Ok(_) => {}
            Err(e) => report(&e),
        }
    }

    fn on_walk_error(&self, error: SearchError) {
        report(&error);
    }
}

fn report(error: &SearchError) {
    eprintln!("{}", format!("grip: {}", error).red());
}

/// Path on its own line, then `<line>:<text>` per match with the matched text highlighted
pub fn render_file(file: &FileResult) -> String {
    let mut block = format!("\n{}\n", file.path.display().to_string().yellow());
    for m in &file.matches {
        let _ = writeln!(
            block,
            "{}:{}",
            m.line_number.to_string().green(),
            m.render(|text| text.red().to_string())
        );
    }
    block
}

pub fn summary_line(stats: &StatsSnapshot) -> String {
    let mut line = format!(
        "Scanned {} files in {} directories: {} matches in {} files",
        stats.files_scanned, stats.dirs_walked, stats.total_matches, stats.files_with_matches
    );
    let failures = stats.scan_errors + stats.dirs_failed;
    if failures > 0 {
        let _ = write!(line, " ({} could not be read)", failures);
    }
    line
}
