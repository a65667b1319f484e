//! Logging setup for the Flatcar binaries
//!
//! Records go to two sinks. The session log file receives everything down to
//! the requested level, while the terminal is capped at `INFO` so that
//! planner and integrator diagnostics don't flood it during long runs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Most verbose level shown on the terminal.
const TERMINAL_MAX_LEVEL: LevelFilter = LevelFilter::Info;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Logging must at least include `INFO` records, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set for this process: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise logging for this execution.
///
/// `min_level` applies to the session log file and must be `Info` or more
/// verbose. Can only succeed once per process.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < LevelFilter::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let terminal = fern::Dispatch::new()
        .level(min_level.min(TERMINAL_MAX_LEVEL))
        .format(|out, message, record| finish_record(out, message, record, true))
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .level(min_level)
        .format(|out, message, record| finish_record(out, message, record, false))
        .chain(log_file);

    fern::Dispatch::new()
        .level(min_level)
        .chain(terminal)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log file level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Prefix a message with the session time, the level tag and, for debug and
/// trace records, the module the record came from.
fn finish_record(
    out: fern::FormatCallback,
    message: &fmt::Arguments,
    record: &Record,
    coloured: bool,
) {
    let elapsed = session::get_elapsed_seconds();

    let tag = if coloured {
        level_tag(record.level())
    } else {
        level_name(record.level()).normal()
    };

    if record.level() > Level::Info {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            elapsed,
            tag,
            record.target(),
            message
        ))
    } else {
        out.finish(format_args!("[{:10.6} {}] {}", elapsed, tag, message))
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info => "INF",
        Level::Warn => "WRN",
        Level::Error => "ERR",
    }
}

fn level_tag(level: Level) -> ColoredString {
    let name = level_name(level);

    match level {
        Level::Trace => name.dimmed().italic(),
        Level::Debug => name.dimmed(),
        Level::Info => name.normal(),
        Level::Warn => name.yellow(),
        Level::Error => name.red().bold(),
    }
}
