use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace, warn};

use crate::config::EncodingMode;
use crate::errors::{SearchError, SearchResult};
use crate::results::{FileResult, Match, ScanOutcome};

const BUFFER_CAPACITY: usize = 65536;
const LINE_CAPACITY: usize = 256;

/// Searches single files for a literal, case-sensitive substring
#[derive(Debug, Clone)]
pub struct Scanner {
    search_text: String,
    encoding_mode: EncodingMode,
}

impl Scanner {
    /// Creates a scanner for `search_text`.
    ///
    /// An empty search text matches every position of every line; callers are expected to
    /// reject it beforehand (see [`crate::SearchConfig::validate`]).
    pub fn new(search_text: impl Into<String>, encoding_mode: EncodingMode) -> Self {
        Self {
            search_text: search_text.into(),
            encoding_mode,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Scans `directory/file_name`
    pub fn scan(&self, directory: &Path, file_name: &OsStr) -> ScanOutcome {
        self.scan_path(&directory.join(file_name))
    }

    /// Scans the file at `path`.
    ///
    /// Failing to open the file and failing part way through both come back as `Err`;
    /// either way only this file is affected.
    pub fn scan_path(&self, path: &Path) -> ScanOutcome {
        trace!("Scanning file: {}", path.display());
        let file = File::open(path).map_err(|e| SearchError::from_open(path, e))?;
        self.scan_reader(path, BufReader::with_capacity(BUFFER_CAPACITY, file))
    }

    /// Scans already-open content, attributing results and errors to `path`
    pub fn scan_reader<R: BufRead>(&self, path: &Path, mut reader: R) -> ScanOutcome {
        let mut result = FileResult::new(path);
        let mut buffer = Vec::with_capacity(LINE_CAPACITY);
        let mut line_number = 0;
        let mut replaced_invalid = false;

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|e| SearchError::io(path, e))?;
            if read == 0 {
                break;
            }
            line_number += 1;
            strip_line_terminator(&mut buffer);

            let line = self.decode_line(&buffer, path, line_number, &mut replaced_invalid)?;
            if let Some(found) = self.match_line(line_number, line) {
                result.matches.push(found);
            }
        }

        debug!(
            "Found {} matching lines in {}",
            result.matches.len(),
            path.display()
        );
        Ok(result)
    }

    /// Returns a match for the line if it contains the search text
    pub fn match_line(&self, line_number: usize, line: Cow<'_, str>) -> Option<Match> {
        let spans: Vec<(usize, usize)> = line
            .match_indices(self.search_text.as_str())
            .map(|(start, matched)| (start, start + matched.len()))
            .collect();

        if spans.is_empty() {
            return None;
        }
        Some(Match {
            line_number,
            line_content: line.into_owned(),
            spans,
        })
    }

    fn decode_line<'a>(
        &self,
        bytes: &'a [u8],
        path: &Path,
        line_number: usize,
        replaced_invalid: &mut bool,
    ) -> SearchResult<Cow<'a, str>> {
        match self.encoding_mode {
            EncodingMode::FailFast => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|_| SearchError::encoding(path, line_number)),
            EncodingMode::Lossy => {
                let line = String::from_utf8_lossy(bytes);
                if matches!(line, Cow::Owned(_)) && !*replaced_invalid {
                    warn!("Invalid UTF-8 replaced in file: {}", path.display());
                    *replaced_invalid = true;
                }
                Ok(line)
            }
        }
    }
}

/// Drops a trailing `\n` or `\r\n`
fn strip_line_terminator(buffer: &mut Vec<u8>) {
    if buffer.last() == Some(&b'\n') {
        buffer.pop();
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }
    }
}
