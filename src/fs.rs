//! Tab body files.
//!
//! `subtab run --output-dir DIR` writes each tab body to `DIR/<tab>.txt` for
//! the host page renderer. Bodies are written to `.<tab>.txt.tmp`, synced,
//! then renamed over the target so a reader never sees a partial body.

use crate::error::{Result, TabError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Extension of tab body files.
pub const BODY_EXTENSION: &str = "txt";

/// Path of the body file for a tab.
pub fn body_path(dir: &Path, tab_name: &str) -> PathBuf {
    dir.join(format!("{}.{}", tab_name, BODY_EXTENSION))
}

/// Atomically write a tab body, creating `dir` if needed.
pub fn write_body(dir: &Path, tab_name: &str, body: &str) -> Result<PathBuf> {
    if tab_name.is_empty() || tab_name.contains(['/', '\\']) || tab_name == ".." {
        return Err(TabError::UserError(format!(
            "tab name '{}' cannot be used as a file name",
            tab_name
        )));
    }

    fs::create_dir_all(dir).map_err(|e| {
        TabError::UserError(format!(
            "failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let target = body_path(dir, tab_name);
    let temp = dir.join(format!(".{}.{}.tmp", tab_name, BODY_EXTENSION));

    write_and_sync(&temp, body.as_bytes())?;
    replace(&temp, &target)?;

    Ok(target)
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        TabError::UserError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            TabError::UserError(format!(
                "failed to write temporary file '{}': {}",
                path.display(),
                e
            ))
        })
}

fn replace(source: &Path, target: &Path) -> Result<()> {
    // rename() replaces an existing target on POSIX but not on Windows.
    if cfg!(windows) && target.exists() {
        let _ = fs::remove_file(target);
    }

    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        TabError::UserError(format!(
            "failed to move body into place at '{}': {}",
            target.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_body_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("report").join("tabs");

        let path = write_body(&out, "summary", "ok\n").unwrap();

        assert_eq!(path, out.join("summary.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "ok\n");
        assert!(!out.join(".summary.txt.tmp").exists());
    }

    #[test]
    fn test_write_body_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("summary.txt"), "old").unwrap();

        write_body(temp_dir.path(), "summary", "new").unwrap();

        let content = fs::read_to_string(temp_dir.path().join("summary.txt")).unwrap();
        assert_eq!(content, "new");
    }

    #[test]
    fn test_write_body_rejects_path_like_names() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["", "..", "a/b", "a\\b"] {
            let err = write_body(temp_dir.path(), name, "x").unwrap_err();
            assert!(matches!(err, TabError::UserError(_)));
        }
    }
}
