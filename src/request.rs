//! What a single cleanup run is asked to do.

use crate::error::CleanupError;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which filesystem timestamp judges a file's age.
/// No `Default`: callers always pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampStrategy {
    LastModified,
    LastAccessed,
    Created,
}

impl TimestampStrategy {
    pub const ALL: [TimestampStrategy; 3] = [
        TimestampStrategy::LastModified,
        TimestampStrategy::LastAccessed,
        TimestampStrategy::Created,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimestampStrategy::LastModified => "last-modified",
            TimestampStrategy::LastAccessed => "last-accessed",
            TimestampStrategy::Created => "created",
        }
    }
}

impl fmt::Display for TimestampStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimestampStrategy {
    type Err = CleanupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "lastmodified" | "modified" | "mtime" | "lastupdatedate" => {
                Ok(TimestampStrategy::LastModified)
            }
            "lastaccessed" | "accessed" | "atime" | "lastaccessdate" => {
                Ok(TimestampStrategy::LastAccessed)
            }
            "created" | "ctime" | "birth" | "createdate" => Ok(TimestampStrategy::Created),
            _ => Err(CleanupError::UnsupportedStrategy(s.to_string())),
        }
    }
}

/// How directories without files are treated once old files are gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyDirectoryPolicy {
    /// A directory with no direct files is removed, with the same recursion
    /// mode as the run. Subdirectories are not inspected, so with a recursive
    /// run the whole subtree goes, files included.
    #[default]
    DirectFiles,
    /// Deepest directories first; a directory is removed only when it has no
    /// entries left at all.
    DeepestFirst,
}

impl FromStr for EmptyDirectoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "direct-files" => Ok(EmptyDirectoryPolicy::DirectFiles),
            "deepest-first" => Ok(EmptyDirectoryPolicy::DeepestFirst),
            other => Err(format!(
                "Unknown empty directory policy '{other}'. Expected 'direct-files' or 'deepest-first'"
            )),
        }
    }
}

/// Immutable description of one cleanup run.
#[derive(Debug, Clone)]
pub struct CleanupRequest {
    root_path: PathBuf,
    retention_window: TimeDelta,
    recursive: bool,
    delete_empty_directories: bool,
    timestamp_strategy: TimestampStrategy,
    empty_directory_policy: EmptyDirectoryPolicy,
}

impl CleanupRequest {
    pub fn new(
        root_path: impl Into<PathBuf>,
        retention_window: TimeDelta,
        recursive: bool,
        delete_empty_directories: bool,
        timestamp_strategy: TimestampStrategy,
    ) -> Self {
        Self {
            root_path: root_path.into(),
            retention_window,
            recursive,
            delete_empty_directories,
            timestamp_strategy,
            empty_directory_policy: EmptyDirectoryPolicy::default(),
        }
    }

    pub fn with_empty_directory_policy(mut self, policy: EmptyDirectoryPolicy) -> Self {
        self.empty_directory_policy = policy;
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn retention_window(&self) -> TimeDelta {
        self.retention_window
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn delete_empty_directories(&self) -> bool {
        self.delete_empty_directories
    }

    pub fn timestamp_strategy(&self) -> TimestampStrategy {
        self.timestamp_strategy
    }

    pub fn empty_directory_policy(&self) -> EmptyDirectoryPolicy {
        self.empty_directory_policy
    }

    /// Instant below which a file is outside the retention window.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.retention_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
