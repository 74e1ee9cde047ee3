use std::ffi::{OsStr, OsString};
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::scanner::Scanner;
use super::sink::Sink;
use crate::config::EncodingMode;
use crate::errors::SearchError;
use crate::metrics::SearchStats;

/// Names starting with this are hidden
const HIDDEN_MARKER: char = '.';

/// Options shared by every walker of one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Descend into hidden directories. Hidden files are scanned regardless.
    pub include_hidden: bool,
    pub encoding_mode: EncodingMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
    /// Symlink to a directory; never followed
    DirectoryLink,
}

/// Walks one directory, fanning out a task per file and per subdirectory
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    options: WalkOptions,
    stats: SearchStats,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, options: WalkOptions) -> Self {
        Self::with_stats(root, options, SearchStats::new())
    }

    /// Creates a walker that records into existing counters
    pub fn with_stats(root: impl Into<PathBuf>, options: WalkOptions, stats: SearchStats) -> Self {
        Self {
            root: root.into(),
            options,
            stats,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> WalkOptions {
        self.options
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Searches the tree below this walker's root for `search_text`.
    ///
    /// Every outcome goes to `sink`. Returns once every file reachable from the root has
    /// been scanned. Runs on the current rayon pool; see [`super::search`] for a bounded one.
    pub fn walk<S>(&self, search_text: &str, sink: &S)
    where
        S: Sink + ?Sized,
    {
        let scanner = Scanner::new(search_text, self.options.encoding_mode);
        self.dig(&scanner, sink);
    }

    fn dig<S>(&self, scanner: &Scanner, sink: &S)
    where
        S: Sink + ?Sized,
    {
        let (dirs, files) = self.list_entries(sink);
        debug!(
            "Walking {}: {} files, {} subdirectories",
            self.root.display(),
            files.len(),
            dirs.len()
        );

        rayon::scope(|scope| {
            for name in files {
                scope.spawn(move |_| {
                    let outcome = scanner.scan(&self.root, &name);
                    self.stats.record_scan(&outcome);
                    sink.on_file(outcome);
                });
            }
            for name in dirs {
                let child = self.child(&name);
                scope.spawn(move |_| child.dig(scanner, sink));
            }
        });
    }

    fn child(&self, name: &OsStr) -> Walker {
        Walker::with_stats(self.root.join(name), self.options, self.stats.clone())
    }

    /// Splits the directory's entries into (subdirectories, files).
    ///
    /// A directory that cannot be listed is reported and treated as empty.
    fn list_entries<S>(&self, sink: &S) -> (Vec<OsString>, Vec<OsString>)
    where
        S: Sink + ?Sized,
    {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to list {}: {}", self.root.display(), e);
                self.stats.record_dir_failed();
                sink.on_walk_error(SearchError::invalid_directory(&self.root, e));
                return (Vec::new(), Vec::new());
            }
        };
        self.stats.record_dir_walked();

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read entry in {}: {}", self.root.display(), e);
                    sink.on_walk_error(SearchError::io(&self.root, e));
                    continue;
                }
            };
            let name = entry.file_name();
            match classify(&entry) {
                EntryKind::Directory => {
                    if !self.options.include_hidden && is_hidden(&name) {
                        debug!("Skipping hidden directory: {}", entry.path().display());
                        self.stats.record_dir_skipped();
                        continue;
                    }
                    dirs.push(name);
                }
                EntryKind::DirectoryLink => {
                    debug!("Not following directory link: {}", entry.path().display());
                }
                EntryKind::File => files.push(name),
            }
        }
        (dirs, files)
    }
}

fn classify(entry: &DirEntry) -> EntryKind {
    match entry.file_type() {
        Ok(file_type) if file_type.is_dir() => EntryKind::Directory,
        Ok(file_type) if file_type.is_symlink() => match fs::metadata(entry.path()) {
            Ok(target) if target.is_dir() => EntryKind::DirectoryLink,
            _ => EntryKind::File,
        },
        Ok(_) => EntryKind::File,
        Err(e) => {
            trace!("No file type for {}: {}", entry.path().display(), e);
            EntryKind::File
        }
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with(HIDDEN_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::sink::CollectingSink;
    use tempfile::tempdir;

    fn matched_paths(sink: CollectingSink) -> Vec<PathBuf> {
        let (outcomes, _) = sink.into_parts();
        let mut paths: Vec<PathBuf> = outcomes
            .into_iter()
            .filter_map(Result::ok)
            .filter(|file| file.has_matches())
            .map(|file| file.path)
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(OsStr::new(".git")));
        assert!(is_hidden(OsStr::new(".")));
        assert!(!is_hidden(OsStr::new("src")));
        assert!(!is_hidden(OsStr::new("a.b")));
    }

    #[test]
    fn test_hidden_directories_skipped_by_default() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "needle").unwrap();
        fs::write(dir.path().join("visible.txt"), "needle").unwrap();

        let walker = Walker::new(dir.path(), WalkOptions::default());
        let sink = CollectingSink::new();
        walker.walk("needle", &sink);

        assert_eq!(matched_paths(sink), vec![dir.path().join("visible.txt")]);
        let stats = walker.stats().snapshot();
        assert_eq!(stats.dirs_skipped, 1);
        assert_eq!(stats.files_scanned, 1);
    }

    #[test]
    fn test_hidden_directories_walked_when_enabled() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "needle").unwrap();

        let options = WalkOptions {
            include_hidden: true,
            ..WalkOptions::default()
        };
        let sink = CollectingSink::new();
        Walker::new(dir.path(), options).walk("needle", &sink);

        assert_eq!(matched_paths(sink), vec![dir.path().join(".git/config")]);
    }

    #[test]
    fn test_hidden_files_always_scanned() {
        for include_hidden in [false, true] {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".env"), "TOKEN=needle\n").unwrap();

            let options = WalkOptions {
                include_hidden,
                ..WalkOptions::default()
            };
            let sink = CollectingSink::new();
            Walker::new(dir.path(), options).walk("needle", &sink);

            assert_eq!(matched_paths(sink), vec![dir.path().join(".env")]);
        }
    }

    #[test]
    fn test_unlistable_root_reports_and_scans_nothing() {
        let dir = tempdir().unwrap();
        let walker = Walker::new(dir.path().join("missing"), WalkOptions::default());
        let sink = CollectingSink::new();
        walker.walk("needle", &sink);

        let (outcomes, walk_errors) = sink.into_parts();
        assert!(outcomes.is_empty());
        assert_eq!(walk_errors.len(), 1);
        assert!(matches!(walk_errors[0], SearchError::InvalidDirectory { .. }));
        assert_eq!(walker.stats().snapshot().dirs_failed, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_subdirectory_leaves_siblings_intact() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("inside.txt"), "needle").unwrap();
        fs::create_dir(dir.path().join("open")).unwrap();
        fs::write(dir.path().join("open/hit.txt"), "needle").unwrap();
        fs::write(dir.path().join("top.txt"), "needle").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Root ignores directory permissions
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let walker = Walker::new(dir.path(), WalkOptions::default());
        let sink = CollectingSink::new();
        walker.walk("needle", &sink);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let stats = walker.stats().snapshot();
        let (outcomes, walk_errors) = sink.into_parts();
        assert_eq!(walk_errors.len(), 1);
        assert!(matches!(
            &walk_errors[0],
            SearchError::InvalidDirectory { path, .. } if path == &locked
        ));
        assert_eq!(stats.dirs_failed, 1);
        assert_eq!(stats.files_scanned, 2);

        let mut matched: Vec<PathBuf> = outcomes
            .into_iter()
            .filter_map(Result::ok)
            .filter(|file| file.has_matches())
            .map(|file| file.path)
            .collect();
        matched.sort();
        assert_eq!(
            matched,
            vec![dir.path().join("open/hit.txt"), dir.path().join("top.txt")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_links_not_followed() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real/hit.txt"), "needle").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("loop")).unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("real/up")).unwrap();

        let sink = CollectingSink::new();
        Walker::new(dir.path(), WalkOptions::default()).walk("needle", &sink);

        assert_eq!(matched_paths(sink), vec![dir.path().join("real/hit.txt")]);
    }
}
