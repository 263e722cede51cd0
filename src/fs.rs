//! Filesystem access used by the cleaner.

pub mod memory;

use crate::error::{CleanupError, Result};
use crate::request::TimestampStrategy;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use memory::{FileTimes, MemoryFileSystem};

/// Everything the cleaner needs from a filesystem.
///
/// Listings are sorted by file name with parents ahead of their children.
/// Errors carry the path that failed.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Files below `path`; only direct children unless `recursive`.
    fn list_files(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>>;

    /// Directories below `path`, excluding `path` itself.
    fn list_directories(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>>;

    /// Whether the directory holds anything at all, files or directories.
    fn has_entries(&self, path: &Path) -> Result<bool>;

    fn timestamp(&self, path: &Path, strategy: TimestampStrategy) -> Result<DateTime<Utc>>;

    fn delete_file(&self, path: &Path) -> Result<()>;

    /// Remove a directory. Without `recursive` the directory must be empty.
    fn delete_directory(&self, path: &Path, recursive: bool) -> Result<()>;
}

/// The real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    fn walk(
        &self,
        path: &Path,
        recursive: bool,
        want_dirs: bool,
    ) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let failed = e.path().unwrap_or(path).to_path_buf();
                CleanupError::io(failed, e.into())
            })?;

            // Symlinks are not followed and count as files.
            if entry.file_type().is_dir() == want_dirs {
                found.push(entry.into_path());
            }
        }

        Ok(found)
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        self.walk(path, recursive, false)
    }

    fn list_directories(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        self.walk(path, recursive, true)
    }

    fn has_entries(&self, path: &Path) -> Result<bool> {
        let mut entries = std::fs::read_dir(path).map_err(|e| CleanupError::io(path, e))?;
        match entries.next() {
            None => Ok(false),
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(CleanupError::io(path, e)),
        }
    }

    fn timestamp(&self, path: &Path, strategy: TimestampStrategy) -> Result<DateTime<Utc>> {
        let meta = std::fs::symlink_metadata(path).map_err(|e| CleanupError::io(path, e))?;
        let time = match strategy {
            TimestampStrategy::LastModified => meta.modified(),
            TimestampStrategy::LastAccessed => meta.accessed(),
            TimestampStrategy::Created => meta.created(),
        }
        .map_err(|e| CleanupError::io(path, e))?;

        Ok(DateTime::<Utc>::from(time))
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|e| CleanupError::io(path, e))
    }

    fn delete_directory(&self, path: &Path, recursive: bool) -> Result<()> {
        let removed = if recursive {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_dir(path)
        };
        removed.map_err(|e| CleanupError::io(path, e))
    }
}
