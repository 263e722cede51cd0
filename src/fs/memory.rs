//! In-memory filesystem for exercising the cleaner without touching disk.

use super::FileSystem;
use crate::error::{CleanupError, Result};
use crate::request::TimestampStrategy;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// Timestamps of a virtual file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub modified: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
    pub created: DateTime<Utc>,
}

impl FileTimes {
    /// All three timestamps set to the same instant.
    pub fn all(at: DateTime<Utc>) -> Self {
        Self {
            modified: at,
            accessed: at,
            created: at,
        }
    }

    fn get(&self, strategy: TimestampStrategy) -> DateTime<Utc> {
        match strategy {
            TimestampStrategy::LastModified => self.modified,
            TimestampStrategy::LastAccessed => self.accessed,
            TimestampStrategy::Created => self.created,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Dir,
    File(FileTimes),
}

/// A tree of directories and files kept in a sorted map.
///
/// Paths sort component-wise, so iteration order matches a pre-order walk
/// sorted by file name.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    locked: RefCell<HashSet<PathBuf>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory and any missing ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) -> &Self {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.as_ref().ancestors() {
            // Filesystem root and the empty path are implicit.
            if ancestor.parent().is_none() {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
        drop(nodes);
        self
    }

    /// Create a file, along with any missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, times: FileTimes) -> &Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(times));
        self
    }

    /// Make every later delete of `path` fail with `PermissionDenied`.
    pub fn lock(&self, path: impl AsRef<Path>) -> &Self {
        self.locked.borrow_mut().insert(path.as_ref().to_path_buf());
        self
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.nodes.borrow().contains_key(path.as_ref())
    }

    /// Every path currently present, in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.nodes.borrow().keys().cloned().collect()
    }

    fn node(&self, path: &Path) -> Option<Node> {
        self.nodes.borrow().get(path).copied()
    }

    fn require_dir(&self, path: &Path) -> Result<()> {
        match self.node(path) {
            Some(Node::Dir) => Ok(()),
            Some(Node::File(_)) => Err(failure(path, io::ErrorKind::Other, "not a directory")),
            None => Err(failure(path, io::ErrorKind::NotFound, "no such directory")),
        }
    }

    fn require_unlocked(&self, path: &Path) -> Result<()> {
        if self.locked.borrow().contains(path) {
            return Err(failure(
                path,
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        Ok(())
    }

    fn children(&self, path: &Path, recursive: bool, want_dirs: bool) -> Result<Vec<PathBuf>> {
        self.require_dir(path)?;
        let nodes = self.nodes.borrow();
        Ok(nodes
            .iter()
            .filter(|(p, _)| p.as_path() != path && p.starts_with(path))
            .filter(|(p, _)| recursive || p.parent() == Some(path))
            .filter(|(_, node)| matches!(node, Node::Dir) == want_dirs)
            .map(|(p, _)| p.clone())
            .collect())
    }
}

fn failure(path: &Path, kind: io::ErrorKind, message: &str) -> CleanupError {
    CleanupError::io(path, io::Error::new(kind, message.to_string()))
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(Node::Dir))
    }

    fn list_files(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        self.children(path, recursive, false)
    }

    fn list_directories(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        self.children(path, recursive, true)
    }

    fn has_entries(&self, path: &Path) -> Result<bool> {
        self.require_dir(path)?;
        Ok(self
            .nodes
            .borrow()
            .keys()
            .any(|p| p.parent() == Some(path)))
    }

    fn timestamp(&self, path: &Path, strategy: TimestampStrategy) -> Result<DateTime<Utc>> {
        match self.node(path) {
            Some(Node::File(times)) => Ok(times.get(strategy)),
            Some(Node::Dir) => Err(failure(path, io::ErrorKind::Other, "is a directory")),
            None => Err(failure(path, io::ErrorKind::NotFound, "no such file")),
        }
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        match self.node(path) {
            Some(Node::File(_)) => {}
            Some(Node::Dir) => return Err(failure(path, io::ErrorKind::Other, "is a directory")),
            None => return Err(failure(path, io::ErrorKind::NotFound, "no such file")),
        }
        self.require_unlocked(path)?;
        self.nodes.borrow_mut().remove(path);
        Ok(())
    }

    fn delete_directory(&self, path: &Path, recursive: bool) -> Result<()> {
        self.require_dir(path)?;
        self.require_unlocked(path)?;

        if !recursive && self.has_entries(path)? {
            return Err(failure(path, io::ErrorKind::Other, "directory not empty"));
        }

        self.nodes.borrow_mut().retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}
