//! Utilities for logging.

use std::io;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Format of emitted log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggingMode {
    /// Multi-line, human readable output.
    #[default]
    Pretty,
    /// One json object per line.
    Json,
    /// Single line, human readable output.
    Compact,
}

/// Map a `-v` count to the default log level.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialize the global logger writing to stderr.
///
/// The level picked from `verbosity` may be overridden with `RUST_LOG`.
pub fn init(verbosity: u8, mode: LoggingMode) {
    configure_global_logger(level_for_verbosity(verbosity), mode, io::stderr);
}

/// Initialize a logger suitable for tests. Output is captured by the test
/// harness.
pub fn init_test() {
    let filter = env_filter(Level::DEBUG);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Configure the global subscriber.
///
/// Calling this more than once is a no-op, the first subscriber wins.
pub fn configure_global_logger<W>(default_level: Level, mode: LoggingMode, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer);

    let _ = match mode {
        LoggingMode::Pretty => builder.pretty().try_init(),
        LoggingMode::Json => builder.json().try_init(),
        LoggingMode::Compact => builder.compact().try_init(),
    };
}

fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy()
}
