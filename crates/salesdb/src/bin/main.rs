use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use salesdb::commands::Commands;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LoggingMode {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl From<LoggingMode> for logutil::LoggingMode {
    fn from(mode: LoggingMode) -> Self {
        match mode {
            LoggingMode::Pretty => logutil::LoggingMode::Pretty,
            LoggingMode::Json => logutil::LoggingMode::Json,
            LoggingMode::Compact => logutil::LoggingMode::Compact,
        }
    }
}

#[derive(Parser)]
#[clap(name = "salesdb")]
#[clap(version)]
#[clap(about = "Analyze retail sales data", long_about = None)]
struct Cli {
    /// Log verbosity.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Format of log output.
    #[clap(long, global = true, value_enum)]
    log_mode: Option<LoggingMode>,

    #[clap(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logutil::init(cli.verbose, cli.log_mode.unwrap_or_default().into());
    info!(version = env!("CARGO_PKG_VERSION"), "starting...");

    match cli.command.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}
