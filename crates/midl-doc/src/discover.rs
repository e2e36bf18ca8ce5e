//! Input discovery

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{DocError, Result};

/// A file is returned as-is; a directory is scanned recursively for
/// `*.{extension}`. Results are sorted for deterministic batches.
pub fn discover(path: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(DocError::io(
            path,
            io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
        ));
    }

    let root = glob::Pattern::escape(&path.to_string_lossy());
    let pattern = format!("{}/**/*.{}", root, extension.trim_start_matches('.'));

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(p) if p.is_file() => files.push(p),
            Ok(_) => {}
            Err(err) => {
                warn!(path = %err.path().display(), error = %err.error(), "unreadable entry")
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_directory_is_scanned_recursively() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("b.idl"), "").unwrap();
        fs::write(dir.path().join("sub/deeper/a.idl"), "").unwrap();
        fs::write(dir.path().join("sub/notes.txt"), "").unwrap();

        let files = discover(dir.path(), "idl").unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b.idl"), dir.path().join("sub/deeper/a.idl")]
        );
    }

    #[test]
    fn test_file_is_returned_as_is() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("lib.odl");
        fs::write(&file, "").unwrap();
        assert_eq!(discover(&file, "idl").unwrap(), vec![file]);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("absent"), "idl").unwrap_err();
        assert!(matches!(err, DocError::Io { .. }));
    }
}
