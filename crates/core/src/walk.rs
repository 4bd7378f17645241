use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::ReportConfig;
use crate::model::{FileEntry, SkipReason, WalkItem};

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub include_directories: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    pub excludes: Vec<String>,
}

impl From<&ReportConfig> for WalkOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            include_directories: config.include_directories,
            follow_links: config.follow_links,
            max_depth: config.max_depth,
            excludes: config.excludes.clone(),
        }
    }
}

/// Depth-first, read-only traversal of one or more roots.
///
/// Every problem is reported as a [`WalkItem::Skipped`] instead of ending the
/// walk. The root directories themselves are never yielded.
pub struct DirectoryWalker {
    options: WalkOptions,
    excludes: ExcludeMatcher,
}

impl DirectoryWalker {
    pub fn new(options: WalkOptions) -> Self {
        let excludes = ExcludeMatcher::new(&options.excludes);
        Self { options, excludes }
    }

    pub fn walk<'a>(&'a self, roots: &'a [PathBuf]) -> impl Iterator<Item = WalkItem> + 'a {
        roots.iter().flat_map(move |root| self.walk_root(root))
    }

    pub fn walk_root<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = WalkItem> + 'a {
        let mut walker = WalkDir::new(root).follow_links(self.options.follow_links);
        if let Some(depth) = self.options.max_depth {
            walker = walker.max_depth(depth);
        }

        walker
            .into_iter()
            .filter_entry(move |entry| {
                entry.depth() == 0 || !self.excludes.is_excluded(entry.path())
            })
            .filter_map(move |item| match item {
                Ok(entry) => self.classify(entry),
                Err(err) if err.depth() == 0 => {
                    warn!(root = %root.display(), error = %err, "skipping unreadable root");
                    Some(WalkItem::Skipped {
                        path: Some(root.to_path_buf()),
                        reason: SkipReason::RootUnavailable,
                    })
                }
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    Some(WalkItem::Skipped {
                        path: err.path().map(Path::to_path_buf),
                        reason: SkipReason::Unreadable,
                    })
                }
            })
    }

    fn classify(&self, entry: DirEntry) -> Option<WalkItem> {
        if entry.depth() == 0 {
            return None;
        }
        let is_dir = entry.file_type().is_dir();
        if is_dir && !self.options.include_directories {
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!(path = %entry.path().display(), error = %err, "metadata read failed");
                return Some(WalkItem::Skipped {
                    path: Some(entry.into_path()),
                    reason: SkipReason::MetadataUnavailable,
                });
            }
        };

        Some(WalkItem::Entry(FileEntry {
            size_bytes: metadata.len(),
            is_dir,
            created: metadata.created().ok().map(DateTime::<Utc>::from),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            path: entry.into_path(),
        }))
    }
}

/// Prunes subtrees whose path matches any exclude glob.
struct ExcludeMatcher(Option<GlobSet>);

impl ExcludeMatcher {
    fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut added = false;
        for pattern in patterns.iter().map(|pattern| pattern.trim()) {
            if pattern.is_empty() {
                continue;
            }
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    added = true;
                }
                Err(err) => warn!(pattern, error = %err, "ignoring invalid exclude glob"),
            }
        }
        if !added {
            return Self(None);
        }

        match builder.build() {
            Ok(set) => Self(Some(set)),
            Err(err) => {
                warn!(error = %err, "exclude globs disabled");
                Self(None)
            }
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.0.as_ref().is_some_and(|set| set.is_match(path))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn entries(items: impl Iterator<Item = WalkItem>) -> Vec<FileEntry> {
        items
            .filter_map(|item| match item {
                WalkItem::Entry(entry) => Some(entry),
                WalkItem::Skipped { .. } => None,
            })
            .collect()
    }

    #[test]
    fn exclude_matcher_uses_globs_and_ignores_invalid_ones() {
        let matcher = ExcludeMatcher::new(&[
            "**/*.tmp".to_string(),
            "[".to_string(),
            "**/[Cc]aches".to_string(),
        ]);

        assert!(matcher.is_excluded(Path::new("/data/a.tmp")));
        assert!(matcher.is_excluded(Path::new("/data/Library/caches")));
        assert!(!matcher.is_excluded(Path::new("/data/[weird")));
        assert!(!matcher.is_excluded(Path::new("/data/notes.txt")));
        assert!(!ExcludeMatcher::new(&[" ".to_string()]).is_excluded(Path::new("/data")));
    }

    #[test]
    fn nested_files_are_yielded_with_sizes() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("a/b")).expect("mkdir");
        fs::write(dir.path().join("top.bin"), vec![0_u8; 10]).expect("write");
        fs::write(dir.path().join("a/b/deep.bin"), vec![0_u8; 3]).expect("write");

        let walker = DirectoryWalker::new(WalkOptions::default());
        let found = entries(walker.walk_root(dir.path()));

        assert_eq!(found.len(), 2);
        let deep = found
            .iter()
            .find(|entry| entry.path.ends_with("a/b/deep.bin"))
            .expect("deep file listed");
        assert_eq!(deep.size_bytes, 3);
        assert!(!deep.is_dir);
        assert!(deep.modified.is_some());
    }

    #[test]
    fn directories_are_opt_in() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("empty")).expect("mkdir");

        let default_walker = DirectoryWalker::new(WalkOptions::default());
        assert!(entries(default_walker.walk_root(dir.path())).is_empty());

        let walker = DirectoryWalker::new(WalkOptions {
            include_directories: true,
            ..WalkOptions::default()
        });
        let found = entries(walker.walk_root(dir.path()));
        assert_eq!(found.len(), 1);
        assert!(found[0].is_dir);
    }

    #[test]
    fn missing_root_is_tagged_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing");
        fs::write(dir.path().join("kept.txt"), b"kept").expect("write");

        let walker = DirectoryWalker::new(WalkOptions::default());
        let roots = vec![missing.clone(), dir.path().to_path_buf()];
        let items: Vec<WalkItem> = walker.walk(&roots).collect();

        assert!(items.contains(&WalkItem::Skipped {
            path: Some(missing),
            reason: SkipReason::RootUnavailable,
        }));
        assert_eq!(entries(items.into_iter()).len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_is_skipped_and_walk_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.txt"), b"a").expect("write");
        std::os::unix::fs::symlink(dir.path().join("nope"), dir.path().join("dangling"))
            .expect("symlink");
        fs::write(dir.path().join("z.txt"), b"z").expect("write");

        let walker = DirectoryWalker::new(WalkOptions {
            follow_links: true,
            ..WalkOptions::default()
        });
        let items: Vec<WalkItem> = walker.walk_root(dir.path()).collect();

        let unreadable = items
            .iter()
            .filter(|item| {
                matches!(
                    item,
                    WalkItem::Skipped {
                        reason: SkipReason::Unreadable,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(unreadable, 1);
        assert_eq!(entries(items.into_iter()).len(), 2);
    }

    #[test]
    fn excluded_subtrees_are_pruned() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("cache")).expect("mkdir");
        fs::write(dir.path().join("cache/blob"), b"x").expect("write");
        fs::write(dir.path().join("keep.txt"), b"x").expect("write");

        let walker = DirectoryWalker::new(WalkOptions {
            excludes: vec!["**/cache".to_string()],
            ..WalkOptions::default()
        });
        let found = entries(walker.walk_root(dir.path()));
        assert_eq!(found.len(), 1);
        assert!(found[0].path.ends_with("keep.txt"));
    }

    #[test]
    fn max_depth_limits_descent() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested/inner.txt"), b"x").expect("write");
        fs::write(dir.path().join("outer.txt"), b"x").expect("write");

        let walker = DirectoryWalker::new(WalkOptions {
            max_depth: Some(1),
            ..WalkOptions::default()
        });
        let found = entries(walker.walk_root(dir.path()));
        assert_eq!(found.len(), 1);
        assert!(found[0].path.ends_with("outer.txt"));
    }
}
