use clap::Parser;
use filejanitor::Settings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "filejanitor",
    about = "Remove files older than a retention window, and optionally the folders left empty",
    version
)]
pub struct Cli {
    /// Directory to clean
    pub root: Option<PathBuf>,

    /// How long files are kept (e.g. "15d", "48h", "2w", "3m", "07:00:00")
    #[arg(long, short)]
    pub retention: Option<String>,

    /// Timestamp that decides a file's age: last-modified, last-accessed or created
    #[arg(long, short)]
    pub strategy: Option<String>,

    /// Descend into subdirectories
    #[arg(long, short = 'R')]
    pub recursive: bool,

    /// Remove directories that have no files once old files are gone
    #[arg(long)]
    pub delete_empty_dirs: bool,

    /// Which directories count as empty: direct-files or deepest-first
    #[arg(long, value_name = "POLICY")]
    pub empty_dirs: Option<String>,

    /// Settings file (defaults to <config dir>/filejanitor/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log removals instead of printing them
    #[arg(long, short)]
    pub quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Values given on the command line. Absent switches leave the settings
    /// file in charge.
    pub fn overrides(&self) -> Settings {
        Settings {
            root_path: self.root.clone(),
            retention: self.retention.clone(),
            timestamp_strategy: self.strategy.clone(),
            recursive: self.recursive.then_some(true),
            delete_empty_directories: self.delete_empty_dirs.then_some(true),
            empty_directories: self.empty_dirs.clone(),
        }
    }
}
