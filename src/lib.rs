//! filejanitor - retention-based cleanup of old files.
//!
//! A run takes a root directory, a retention window and the timestamp that
//! decides a file's age. Files whose timestamp falls before `now - window` are
//! deleted; directories left without files can be removed afterwards.
//!
//! Filesystem access and deletion announcements go through the [`FileSystem`]
//! and [`Reporter`] traits, so runs can be pointed at the real disk
//! ([`LocalFileSystem`]) or at an in-memory tree ([`MemoryFileSystem`]).

pub mod cleaner;
pub mod error;
pub mod fs;
pub mod report;
pub mod request;
pub mod retention;
pub mod settings;

pub use cleaner::{cleanup, CleanupReport, RetentionCleaner};
pub use error::CleanupError;
pub use fs::{FileSystem, FileTimes, LocalFileSystem, MemoryFileSystem};
pub use report::{Recorder, Reporter, TracingReporter};
pub use request::{CleanupRequest, EmptyDirectoryPolicy, TimestampStrategy};
pub use retention::parse_retention;
pub use settings::Settings;
