/// Result types produced by scanning files.
///
/// A [`FileResult`] owns the [`Match`]es found in one file. Each match keeps the raw line
/// and the byte spans of every occurrence of the search text; turning that into something
/// colored (or plain, or anything else) is left to [`Match::render`] and the caller's
/// highlighter, so scanning never decides how results look.
use std::path::{Path, PathBuf};

use crate::errors::SearchResult;

/// Outcome of scanning a single file: the analyzed file, or why it could not be read.
pub type ScanOutcome = SearchResult<FileResult>;

/// A single line containing the search text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// 1-based line number within the file
    pub line_number: usize,
    /// The line as read, without its terminator
    pub line_content: String,
    /// Byte ranges of every non-overlapping occurrence, left to right
    pub spans: Vec<(usize, usize)>,
}

impl Match {
    /// Builds the display text, passing every matched occurrence through `highlight`.
    ///
    /// Text outside the spans is copied unchanged, so rendering with an identity
    /// highlighter gives back `line_content`.
    pub fn render<F>(&self, highlight: F) -> String
    where
        F: Fn(&str) -> String,
    {
        let mut rendered = String::with_capacity(self.line_content.len() + self.spans.len() * 16);
        let mut cursor = 0;
        for &(start, end) in &self.spans {
            rendered.push_str(&self.line_content[cursor..start]);
            rendered.push_str(&highlight(&self.line_content[start..end]));
            cursor = end;
        }
        rendered.push_str(&self.line_content[cursor..]);
        rendered
    }
}

/// All matches found in a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    /// Directory of the walk joined with the entry name
    pub path: PathBuf,
    /// Matches in line order
    pub matches: Vec<Match>,
}

impl FileResult {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            matches: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match() -> Match {
        Match {
            line_number: 4,
            line_content: "hello world, hello".to_string(),
            spans: vec![(0, 5), (13, 18)],
        }
    }

    #[test]
    fn test_render_marks_every_occurrence() {
        let m = sample_match();
        let rendered = m.render(|text| format!("[{}]", text));
        assert_eq!(rendered, "[hello] world, [hello]");
    }

    #[test]
    fn test_render_identity_is_original_line() {
        let m = sample_match();
        assert_eq!(m.render(str::to_string), m.line_content);
    }

    #[test]
    fn test_render_handles_multibyte_text() {
        let m = Match {
            line_number: 1,
            line_content: "añb añb".to_string(),
            spans: vec![(1, 3), (6, 8)],
        };
        assert_eq!(m.render(|t| format!("<{}>", t)), "a<ñ>b a<ñ>b");
    }

    #[test]
    fn test_file_result_has_matches() {
        let mut file = FileResult::new("dir/test.txt");
        assert!(!file.has_matches());
        assert_eq!(file.path(), Path::new("dir/test.txt"));

        file.matches.push(sample_match());
        assert!(file.has_matches());
    }
}
