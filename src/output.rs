use colored::Colorize;
use filejanitor::{CleanupReport, Reporter};

/// Prints each removal as it happens.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn announce(&mut self, message: &str) {
        println!("  {} {}", "Removing".red(), message.dimmed());
    }
}

pub fn print_summary(report: &CleanupReport) {
    println!();
    println!("{}", "=== Summary ===".bold().white());
    println!(
        "  {:<24} {}",
        "Cutoff:",
        report.cutoff.format("%Y-%m-%d %H:%M:%S UTC").to_string().cyan()
    );
    println!(
        "  {:<24} {}",
        "Files removed:",
        report.files_removed.len().to_string().green()
    );
    println!(
        "  {:<24} {}",
        "Directories removed:",
        report.directories_removed.len().to_string().green()
    );
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), format!("{err:#}").red());
}
