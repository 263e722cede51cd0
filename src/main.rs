mod cli;
mod logging;
mod output;

use clap::Parser;
use cli::Cli;
use filejanitor::{cleanup, CleanupReport, LocalFileSystem, Settings, TracingReporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            if !cli.quiet {
                output::print_summary(&report);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            output::print_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<CleanupReport> {
    let settings = Settings::load(cli.config.as_deref())?.merge(cli.overrides());
    let request = settings.into_request()?;

    let report = if cli.quiet {
        cleanup(&LocalFileSystem, &mut TracingReporter, request)?
    } else {
        cleanup(&LocalFileSystem, &mut output::ConsoleReporter, request)?
    };

    Ok(report)
}
