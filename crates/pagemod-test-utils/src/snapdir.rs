//! Flatten a directory tree into one comparable string.
//! - Respects `.gitignore` and `.ignore` files
//! - Only includes UTF-8 text files (CRLF→LF), ignores binary files
//! - Deterministic path order

use ignore::WalkBuilder;
use std::{fs, path::Path};

/// Every text file under `root` as `--- path` followed by its contents
pub fn dir_manifest(root: impl AsRef<Path>) -> String {
    let base = fs::canonicalize(root.as_ref()).expect("failed to canonicalize root path");

    let mut wb = WalkBuilder::new(&base);
    wb.hidden(true)
        .git_ignore(true)
        .ignore(true)
        .git_exclude(true)
        .git_global(false)
        .parents(false);

    let mut entries: Vec<(String, String)> = Vec::new();
    for dent in wb.build().filter_map(Result::ok) {
        if !dent.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let p = dent.path();
        let rel = p
            .strip_prefix(&base)
            .expect("path should be within base")
            .to_string_lossy()
            .replace('\\', "/");

        let Ok(buf) = fs::read(p) else { continue };
        if let Ok(s) = std::str::from_utf8(&buf) {
            let mut body = s.replace("\r\n", "\n");
            if !body.ends_with('\n') {
                body.push('\n');
            }
            entries.push((rel, body));
        }
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .map(|(rel, body)| format!("--- {rel}\n{body}"))
        .collect()
}
