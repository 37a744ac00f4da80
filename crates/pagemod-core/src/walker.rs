use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ignore::{Walk, WalkBuilder};
use log::{debug, warn};

/// Lazy sequence of page files under a root
///
/// - Always recursive, sorted by file name within each directory
/// - Skips hidden directories and respects git ignore patterns
/// - Prunes any directory whose name is in the exclusion set
/// - A missing root yields nothing
pub struct Pages {
    walk: Option<Walk>,
    page_file: OsString,
}

/// Walk `root` for files named `page_file`, pruning `excluded_dirs`.
///
/// Hidden entries and anything git ignores (inside a git checkout) are
/// skipped as well, so build output such as `.next/` is never visited.
pub fn walk_pages(root: &Path, page_file: &str, excluded_dirs: &[String]) -> Pages {
    if !root.is_dir() {
        debug!("Page root {} does not exist", root.display());
        return Pages {
            walk: None,
            page_file: page_file.into(),
        };
    }

    let excluded = excluded_dirs.to_vec();
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .git_global(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() > 0 && entry.file_type().is_some_and(|ft| ft.is_dir()) {
                if let Some(name) = entry.file_name().to_str() {
                    return !excluded.iter().any(|dir| dir == name);
                }
            }
            true
        });

    Pages {
        walk: Some(builder.build()),
        page_file: page_file.into(),
    }
}

impl Iterator for Pages {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let walk = self.walk.as_mut()?;
        for result in walk.by_ref() {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file())
                        && entry.file_name() == self.page_file
                    {
                        return Some(entry.into_path());
                    }
                }
                Err(e) => warn!("Skipping unreadable entry: {e}"),
            }
        }
        None
    }
}

/// Collect all page files under `root` into a Vec
pub fn collect_pages(root: &Path, page_file: &str, excluded_dirs: &[String]) -> Vec<PathBuf> {
    walk_pages(root, page_file, excluded_dirs).collect()
}
