use crate::error::{CleanupError, Result};
use crate::fs::FileSystem;
use crate::report::Reporter;
use crate::request::{CleanupRequest, EmptyDirectoryPolicy};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a finished run removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub cutoff: DateTime<Utc>,
    pub files_removed: Vec<PathBuf>,
    pub directories_removed: Vec<PathBuf>,
}

/// A file whose comparison timestamp fell before the cutoff.
#[derive(Debug)]
struct FileCandidate {
    path: PathBuf,
    timestamp: DateTime<Utc>,
}

/// Deletes files outside a retention window, then optionally the
/// directories left without files.
///
/// Runs are single-threaded and stop at the first filesystem error. Files
/// already deleted stay deleted; nothing is rolled back.
pub struct RetentionCleaner<'a> {
    fs: &'a dyn FileSystem,
    reporter: &'a mut dyn Reporter,
}

impl<'a> RetentionCleaner<'a> {
    pub fn new(fs: &'a dyn FileSystem, reporter: &'a mut dyn Reporter) -> Self {
        Self { fs, reporter }
    }

    pub fn cleanup(&mut self, request: CleanupRequest) -> Result<CleanupReport> {
        self.cleanup_at(request, Utc::now())
    }

    /// Same as [`cleanup`](Self::cleanup) with an explicit current instant.
    pub fn cleanup_at(
        &mut self,
        request: CleanupRequest,
        now: DateTime<Utc>,
    ) -> Result<CleanupReport> {
        let root = request.root_path();
        self.validate_root(root)?;

        let cutoff = request.cutoff(now);
        debug!(
            root = %root.display(),
            %cutoff,
            strategy = %request.timestamp_strategy(),
            recursive = request.recursive(),
            "Starting retention cleanup"
        );

        let mut files_removed = Vec::new();
        for candidate in self.expired_files(&request, cutoff)? {
            debug!(
                path = %candidate.path.display(),
                timestamp = %candidate.timestamp,
                "Removing file"
            );
            self.reporter.announce(&format!(
                "File: {} is being removed because it's outside of the retention window.",
                candidate.path.display()
            ));
            self.fs.delete_file(&candidate.path)?;
            files_removed.push(candidate.path);
        }

        let directories_removed = if request.delete_empty_directories() {
            match request.empty_directory_policy() {
                EmptyDirectoryPolicy::DirectFiles => {
                    self.remove_directories_without_files(root, request.recursive())?
                }
                EmptyDirectoryPolicy::DeepestFirst => {
                    self.remove_empty_directories_deepest_first(root, request.recursive())?
                }
            }
        } else {
            Vec::new()
        };

        info!(
            root = %root.display(),
            files = files_removed.len(),
            directories = directories_removed.len(),
            "Retention cleanup finished"
        );

        Ok(CleanupReport {
            cutoff,
            files_removed,
            directories_removed,
        })
    }

    fn validate_root(&self, root: &Path) -> Result<()> {
        if !self.fs.exists(root) {
            return Err(CleanupError::InvalidRootPath(root.to_path_buf()));
        }
        if !self.fs.is_dir(root) {
            return Err(CleanupError::NotADirectory(root.to_path_buf()));
        }
        Ok(())
    }

    /// Every timestamp is resolved before anything is deleted.
    fn expired_files(
        &self,
        request: &CleanupRequest,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FileCandidate>> {
        let strategy = request.timestamp_strategy();
        let mut expired = Vec::new();

        for path in self.fs.list_files(request.root_path(), request.recursive())? {
            let timestamp = self.fs.timestamp(&path, strategy)?;
            if timestamp < cutoff {
                debug!(path = %path.display(), %timestamp, "Outside retention window");
                expired.push(FileCandidate { path, timestamp });
            } else {
                debug!(path = %path.display(), %timestamp, "Retained");
            }
        }

        Ok(expired)
    }

    /// Removes each directory that has no direct files, using the run's
    /// recursion mode for the delete. Subdirectories do not count, so in a
    /// recursive run a directory holding only subdirectories is removed with
    /// everything below it.
    fn remove_directories_without_files(
        &mut self,
        root: &Path,
        recursive: bool,
    ) -> Result<Vec<PathBuf>> {
        let mut removed: Vec<PathBuf> = Vec::new();

        for dir in self.fs.list_directories(root, recursive)? {
            // Gone with an ancestor removed earlier in this run.
            if removed.iter().any(|gone| dir.starts_with(gone)) {
                debug!(path = %dir.display(), "Already removed with parent");
                continue;
            }
            if !self.fs.list_files(&dir, false)?.is_empty() {
                continue;
            }

            self.announce_directory(&dir);
            self.fs.delete_directory(&dir, recursive)?;
            removed.push(dir);
        }

        Ok(removed)
    }

    /// Removes directories that hold nothing at all, deepest first, so parents
    /// emptied by this pass go too.
    fn remove_empty_directories_deepest_first(
        &mut self,
        root: &Path,
        recursive: bool,
    ) -> Result<Vec<PathBuf>> {
        let mut directories = self.fs.list_directories(root, recursive)?;
        directories.sort_by_key(|dir| Reverse(dir.components().count()));

        let mut removed = Vec::new();
        for dir in directories {
            if self.fs.has_entries(&dir)? {
                continue;
            }

            self.announce_directory(&dir);
            self.fs.delete_directory(&dir, false)?;
            removed.push(dir);
        }

        Ok(removed)
    }

    fn announce_directory(&mut self, dir: &Path) {
        self.reporter.announce(&format!(
            "Directory: {} is being removed because it's empty.",
            dir.display()
        ));
    }
}

/// One-shot cleanup against the given filesystem and reporter.
pub fn cleanup(
    fs: &dyn FileSystem,
    reporter: &mut dyn Reporter,
    request: CleanupRequest,
) -> Result<CleanupReport> {
    RetentionCleaner::new(fs, reporter).cleanup(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileTimes, MemoryFileSystem};
    use crate::report::Recorder;
    use crate::request::TimestampStrategy;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn aged(days: i64) -> FileTimes {
        FileTimes::all(now() - TimeDelta::days(days))
    }

    fn request(recursive: bool, delete_empty: bool) -> CleanupRequest {
        CleanupRequest::new(
            "/data",
            TimeDelta::days(5),
            recursive,
            delete_empty,
            TimestampStrategy::LastModified,
        )
    }

    fn run(
        fs: &MemoryFileSystem,
        request: CleanupRequest,
    ) -> (Result<CleanupReport>, Vec<String>) {
        let mut recorder = Recorder::new();
        let result = RetentionCleaner::new(fs, &mut recorder).cleanup_at(request, now());
        (result, recorder.messages)
    }

    #[test]
    fn test_scenario_old_and_new_top_level_files() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/a.txt", aged(10))
            .add_file("/data/b.txt", aged(1))
            .add_dir("/data/empty");

        let (result, messages) = run(&fs, request(false, false));
        let report = result.unwrap();

        assert!(!fs.contains("/data/a.txt"));
        assert!(fs.contains("/data/b.txt"));
        assert!(fs.contains("/data/empty"));
        assert_eq!(report.files_removed, vec![PathBuf::from("/data/a.txt")]);
        assert!(report.directories_removed.is_empty());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("/data/a.txt"));
        assert!(messages[0].contains("outside of the retention window"));
    }

    #[test]
    fn test_file_exactly_at_cutoff_is_retained() {
        let fs = MemoryFileSystem::new();
        let just_past = now() - TimeDelta::days(5) - TimeDelta::nanoseconds(1);
        fs.add_file("/data/edge.txt", aged(5))
            .add_file("/data/past.txt", FileTimes::all(just_past));

        let (result, _) = run(&fs, request(false, false));
        let report = result.unwrap();

        assert!(fs.contains("/data/edge.txt"));
        assert!(!fs.contains("/data/past.txt"));
        assert_eq!(report.cutoff, now() - TimeDelta::days(5));
    }

    #[test]
    fn test_strategy_selects_timestamp() {
        let times = FileTimes {
            modified: now() - TimeDelta::days(30),
            accessed: now() - TimeDelta::hours(1),
            created: now() - TimeDelta::days(60),
        };

        let fs = MemoryFileSystem::new();
        fs.add_file("/data/read-recently.log", times);
        let accessed = CleanupRequest::new(
            "/data",
            TimeDelta::days(5),
            false,
            false,
            TimestampStrategy::LastAccessed,
        );
        run(&fs, accessed).0.unwrap();
        assert!(fs.contains("/data/read-recently.log"));

        run(&fs, request(false, false)).0.unwrap();
        assert!(!fs.contains("/data/read-recently.log"));
    }

    #[test]
    fn test_created_strategy() {
        let fs = MemoryFileSystem::new();
        fs.add_file(
            "/data/copied.bin",
            FileTimes {
                modified: now() - TimeDelta::days(100),
                accessed: now() - TimeDelta::days(100),
                created: now() - TimeDelta::days(1),
            },
        );
        let created = CleanupRequest::new(
            "/data",
            TimeDelta::days(5),
            false,
            false,
            TimestampStrategy::Created,
        );

        run(&fs, created).0.unwrap();
        assert!(fs.contains("/data/copied.bin"));
    }

    #[test]
    fn test_non_recursive_leaves_nested_entries() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/old.txt", aged(10))
            .add_file("/data/nested/old.txt", aged(10))
            .add_dir("/data/nested/empty");

        let (result, _) = run(&fs, request(false, true));
        let report = result.unwrap();

        assert!(!fs.contains("/data/old.txt"));
        assert!(fs.contains("/data/nested/old.txt"));
        assert!(fs.contains("/data/nested/empty"));
        assert!(report.directories_removed.is_empty());
    }

    #[test]
    fn test_non_recursive_directory_with_only_subdirectories_fails() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/data/outer/inner");

        let (result, messages) = run(&fs, request(false, true));

        assert!(matches!(
            result,
            Err(CleanupError::FilesystemFailure { ref path, .. }) if path == Path::new("/data/outer")
        ));
        assert!(fs.contains("/data/outer/inner"));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_recursive_removes_old_files_at_every_depth() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/a/b/c/old.txt", aged(9))
            .add_file("/data/a/new.txt", aged(2))
            .add_file("/data/top.txt", aged(6));

        let (result, _) = run(&fs, request(true, false));
        let report = result.unwrap();

        assert_eq!(
            report.files_removed,
            vec![PathBuf::from("/data/a/b/c/old.txt"), PathBuf::from("/data/top.txt")]
        );
        assert!(fs.contains("/data/a/new.txt"));
        assert!(fs.contains("/data/a/b/c"));
    }

    #[test]
    fn test_removes_directory_with_nothing_in_it() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/data/empty").add_file("/data/keep.txt", aged(0));

        let (result, messages) = run(&fs, request(true, true));
        let report = result.unwrap();

        assert!(!fs.contains("/data/empty"));
        assert!(fs.contains("/data"));
        assert_eq!(report.directories_removed, vec![PathBuf::from("/data/empty")]);
        assert!(messages[0].contains("because it's empty"));
    }

    #[test]
    fn test_directory_emptied_by_file_removal_is_removed() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/logs/old.log", aged(20));

        let (result, messages) = run(&fs, request(true, true));
        let report = result.unwrap();

        assert!(!fs.contains("/data/logs"));
        assert_eq!(report.files_removed.len(), 1);
        assert_eq!(report.directories_removed.len(), 1);
        // Files are announced before directories.
        assert!(messages[0].starts_with("File:"));
        assert!(messages[1].starts_with("Directory:"));
    }

    #[test]
    fn test_direct_files_policy_removes_subtree_with_retained_files() {
        // A directory whose only children are subdirectories has no direct
        // files, so it is removed recursively along with newer files below it.
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/project/src/fresh.rs", aged(1));

        let (result, messages) = run(&fs, request(true, true));
        let report = result.unwrap();

        assert!(report.files_removed.is_empty());
        assert_eq!(report.directories_removed, vec![PathBuf::from("/data/project")]);
        assert!(!fs.contains("/data/project/src/fresh.rs"));
        assert!(!fs.contains("/data/project"));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_direct_files_policy_skips_directories_removed_with_parent() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/data/a/b/c").add_dir("/data/z");

        let (result, _) = run(&fs, request(true, true));
        let report = result.unwrap();

        assert_eq!(
            report.directories_removed,
            vec![PathBuf::from("/data/a"), PathBuf::from("/data/z")]
        );
        assert_eq!(fs.paths(), vec![PathBuf::from("/data")]);
    }

    #[test]
    fn test_deepest_first_policy_keeps_subtree_with_retained_files() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/project/src/fresh.rs", aged(1))
            .add_file("/data/project/build/old.o", aged(30))
            .add_dir("/data/project/build/cache/tmp");

        let deepest = request(true, true).with_empty_directory_policy(EmptyDirectoryPolicy::DeepestFirst);
        let (result, _) = run(&fs, deepest);
        let report = result.unwrap();

        assert!(fs.contains("/data/project/src/fresh.rs"));
        assert!(!fs.contains("/data/project/build"));
        assert_eq!(
            report.directories_removed,
            vec![
                PathBuf::from("/data/project/build/cache/tmp"),
                PathBuf::from("/data/project/build/cache"),
                PathBuf::from("/data/project/build"),
            ]
        );
    }

    #[test]
    fn test_deepest_first_non_recursive_keeps_directory_with_subdirectory() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/data/outer/inner").add_dir("/data/bare");

        let deepest = request(false, true).with_empty_directory_policy(EmptyDirectoryPolicy::DeepestFirst);
        let (result, _) = run(&fs, deepest);

        assert_eq!(result.unwrap().directories_removed, vec![PathBuf::from("/data/bare")]);
        assert!(fs.contains("/data/outer/inner"));
    }

    #[test]
    fn test_missing_root_is_invalid() {
        let fs = MemoryFileSystem::new();
        let (result, messages) = run(&fs, request(true, true));

        assert!(matches!(result, Err(CleanupError::InvalidRootPath(ref p)) if p == Path::new("/data")));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data", aged(100));

        let (result, messages) = run(&fs, request(true, true));

        assert!(matches!(result, Err(CleanupError::NotADirectory(_))));
        assert!(fs.contains("/data"));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_first_delete_failure_aborts_run() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/1.txt", aged(10))
            .add_file("/data/2.txt", aged(10))
            .add_dir("/data/empty")
            .lock("/data/1.txt");

        let (result, messages) = run(&fs, request(false, true));

        match result {
            Err(CleanupError::FilesystemFailure { path, source }) => {
                assert_eq!(path, PathBuf::from("/data/1.txt"));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected filesystem failure, got {other:?}"),
        }
        assert!(fs.contains("/data/1.txt"));
        assert!(fs.contains("/data/2.txt"));
        assert!(fs.contains("/data/empty"));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_root_is_never_removed() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/data/only.txt", aged(50));

        run(&fs, request(true, true)).0.unwrap();

        assert_eq!(fs.paths(), vec![PathBuf::from("/data")]);
    }

    #[test]
    fn test_cleanup_function_uses_current_time() {
        let fs = MemoryFileSystem::new();
        let ancient = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        fs.add_file("/data/ancient.txt", FileTimes::all(ancient));
        let mut recorder = Recorder::new();

        let report = cleanup(&fs, &mut recorder, request(false, false)).unwrap();

        assert_eq!(report.files_removed.len(), 1);
        assert_eq!(recorder.messages.len(), 1);
    }
}
