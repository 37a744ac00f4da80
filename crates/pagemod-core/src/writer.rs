use atomicwrites::{AtomicFile, OverwriteBehavior};
use similar::TextDiff;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace the file at `path` with `content` when `changed` is set. The
/// write goes through a temporary file so a failure never leaves a
/// half-written page behind. A symlinked page is written at its target and
/// the file keeps its permission bits. Returns whether the file was written.
pub fn persist(path: &Path, content: &str, changed: bool) -> io::Result<bool> {
    if !changed {
        return Ok(false);
    }
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let permissions = fs::metadata(&target).ok().map(|meta| meta.permissions());

    AtomicFile::new(&target, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(content.as_bytes())?;
            f.flush()
        })
        .map_err(|err| match err {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
        })?;

    if let Some(permissions) = permissions {
        fs::set_permissions(&target, permissions)?;
    }
    Ok(true)
}

/// Unified diff between the current and rewritten text of `path`
pub fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    format!(
        "{}",
        diff.unified_diff().context_radius(3).header(
            &format!("old/{}", path.display()),
            &format!("new/{}", path.display())
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_persist_only_when_changed() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("page.tsx");
        fs::write(&path, "before")?;

        assert!(!persist(&path, "after", false)?);
        assert_eq!(fs::read_to_string(&path)?, "before");

        assert!(persist(&path, "after", true)?);
        assert_eq!(fs::read_to_string(&path)?, "after");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_keeps_mode_and_symlink() -> io::Result<()> {
        use std::os::unix::fs::{PermissionsExt, symlink};

        let dir = TempDir::new()?;
        let real = dir.path().join("real.tsx");
        let link = dir.path().join("page.tsx");
        fs::write(&real, "before")?;
        fs::set_permissions(&real, fs::Permissions::from_mode(0o640))?;
        symlink(&real, &link)?;

        assert!(persist(&link, "after", true)?);
        assert!(fs::symlink_metadata(&link)?.file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real)?, "after");
        assert_eq!(fs::metadata(&real)?.permissions().mode() & 0o777, 0o640);
        Ok(())
    }

    #[test]
    fn test_persist_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone").join("page.tsx");
        assert!(persist(&path, "x", true).is_err());
    }

    #[test]
    fn test_unified_diff() {
        let diff = unified_diff(Path::new("crm/page.tsx"), "a\nb\n", "a\nc\n");
        assert!(diff.starts_with("--- old/crm/page.tsx\n+++ new/crm/page.tsx\n"));
        assert!(diff.contains("-b\n+c\n"));
        assert!(unified_diff(Path::new("x"), "same\n", "same\n").is_empty());
    }
}
