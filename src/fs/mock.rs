// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEntry {
    File,
    Dir,
}

/// In-memory filesystem for tests.
///
/// Parents of added entries are created implicitly; `create_dir` follows
/// the real semantics (parent must exist, existing entry is an error).
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    created: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    /// Directories created through [`FileSystem::create_dir`], in order.
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.created.lock().unwrap().clone()
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.entries.lock().unwrap();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries.entry(ancestor.to_path_buf()).or_insert(MockEntry::Dir);
        }
        entries.insert(path.to_path_buf(), entry);
    }

    fn get(&self, path: &Path) -> Option<MockEntry> {
        self.entries.lock().unwrap().get(path).copied()
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::File))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::Dir))
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            ));
        }
        let parent_ok = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => {
                matches!(entries.get(p), Some(MockEntry::Dir))
            }
            _ => true,
        };
        if !parent_ok {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent of {} does not exist", path.display()),
            ));
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir);
        self.created.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
