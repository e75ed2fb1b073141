// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;

pub mod mock;

/// Abstract filesystem interface.
///
/// Covers the few operations the orchestrator performs on disk: preparing
/// the output directory and checking the per-user launcher fallback.
pub trait FileSystem: Send + Sync + Debug {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Create a single directory. The parent must exist.
    ///
    /// Fails with `ErrorKind::AlreadyExists` if something is already at
    /// `path`.
    fn create_dir(&self, path: &Path) -> io::Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }
}

/// Make sure `path` exists as a directory.
///
/// Returns `true` if the directory was created by this call and `false` if
/// it was already there. Something other than a directory at `path` is an
/// error.
pub fn ensure_dir(fs: &dyn FileSystem, path: &Path) -> io::Result<bool> {
    match fs.create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if fs.is_dir(path) {
                Ok(false)
            } else {
                Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists but is not a directory", path.display()),
                ))
            }
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_then_accepts_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");

        assert!(ensure_dir(&RealFileSystem, &dist).unwrap());
        assert!(dist.is_dir());
        assert!(!ensure_dir(&RealFileSystem, &dist).unwrap());
    }

    #[test]
    fn ensure_dir_rejects_a_file_in_the_way() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");
        std::fs::write(&dist, b"not a dir").unwrap();

        let err = ensure_dir(&RealFileSystem, &dist).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(err.to_string().contains("not a directory"));
    }
}
