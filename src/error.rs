use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("Root path {} does not exist", .0.display())]
    InvalidRootPath(PathBuf),

    #[error("Root path {} must be a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Unsupported timestamp strategy: '{0}'")]
    UnsupportedStrategy(String),

    #[error("Filesystem failure at {}: {source}", .path.display())]
    FilesystemFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CleanupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CleanupError::FilesystemFailure {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = CleanupError> = std::result::Result<T, E>;
