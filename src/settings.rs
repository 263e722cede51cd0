//! Settings file and command-line overrides, turned into a [`CleanupRequest`].

use crate::request::{CleanupRequest, EmptyDirectoryPolicy, TimestampStrategy};
use crate::retention::parse_retention;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run can be configured with. Every field is optional so a
/// settings file and the command line can each fill in part of it.
///
/// ```toml
/// root-path = "/var/log/myapp"
/// retention = "14d"
/// timestamp-strategy = "last-modified"
/// recursive = true
/// delete-empty-directories = true
/// empty-directories = "deepest-first"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    pub root_path: Option<PathBuf>,
    pub retention: Option<String>,
    pub timestamp_strategy: Option<String>,
    pub recursive: Option<bool>,
    pub delete_empty_directories: Option<bool>,
    pub empty_directories: Option<String>,
}

impl Settings {
    /// `<config dir>/filejanitor/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("filejanitor").join("config.toml"))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse settings TOML")
    }

    /// Load an explicitly named file, which must exist, or the default file
    /// if there is one.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Self::from_toml(&text)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Values set in `overrides` win.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            root_path: overrides.root_path.or(self.root_path),
            retention: overrides.retention.or(self.retention),
            timestamp_strategy: overrides.timestamp_strategy.or(self.timestamp_strategy),
            recursive: overrides.recursive.or(self.recursive),
            delete_empty_directories: overrides
                .delete_empty_directories
                .or(self.delete_empty_directories),
            empty_directories: overrides.empty_directories.or(self.empty_directories),
        }
    }

    pub fn into_request(self) -> Result<CleanupRequest> {
        let root = self
            .root_path
            .context("No root path given. Pass ROOT or set root-path in the settings file")?;

        let retention = self
            .retention
            .context("No retention window given. Pass --retention or set retention in the settings file")?;
        let retention = parse_retention(&retention)?;

        let strategy = self.timestamp_strategy.context(
            "No timestamp strategy given. Pass --strategy or set timestamp-strategy in the settings file",
        )?;
        let strategy: TimestampStrategy = strategy.parse()?;

        let policy = match self.empty_directories.as_deref() {
            Some(text) => text
                .parse::<EmptyDirectoryPolicy>()
                .map_err(anyhow::Error::msg)?,
            None => EmptyDirectoryPolicy::default(),
        };

        Ok(CleanupRequest::new(
            root,
            retention,
            self.recursive.unwrap_or(false),
            self.delete_empty_directories.unwrap_or(false),
            strategy,
        )
        .with_empty_directory_policy(policy))
    }
}
