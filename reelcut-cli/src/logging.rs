// ============================================================================
// reelcut-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and per-run log file
//
// Everything in the workspace logs through the `log` facade. This module
// installs the one global logger for the binary:
//
// - Console: `env_logger`, honouring RUST_LOG. Info lines are printed bare
//   because they carry the terminal UI; other levels get a timestamp.
// - File: `fern`, always at debug level, styling stripped, written to
//   `<log_dir>/reelcut_run_<YYYYMMDD_HHMMSS>.log`.
//
// USAGE:
// - RUST_LOG=info (default): Normal operation logs
// - RUST_LOG=debug or --verbose: Detailed debugging information
//
// AI-ASSISTANT-INFO: Logger initialization for the CLI

// ---- Internal crate imports ----
use crate::error::{CliErrorContext, CliResult};

// ---- External crate imports ----
use env_logger::{Env, Target};
use log::{Level, LevelFilter};
use reelcut_core::CoreError;

// ---- Standard library imports ----
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the log file for a run started now.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("reelcut_run_{}.log", get_timestamp()))
}

/// Installs the global logger and returns the path of the run's log file.
pub fn init_logging(verbose: bool, log_dir: &Path) -> CliResult<PathBuf> {
    fs::create_dir_all(log_dir).cli_with_context(|| {
        format!("Failed to create log directory '{}'", log_dir.display())
    })?;
    let log_path = run_log_path(log_dir);

    let default_level = if verbose { "debug" } else { "info" };
    let console = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Stderr)
        .format(|buf, record| {
            if record.level() == Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(
                    buf,
                    "[{} {:<5} {}] {}",
                    buf.timestamp_seconds(),
                    record.level(),
                    record.target(),
                    record.args()
                )
            }
        })
        .build();
    let console_level = console.filter();

    let log_file = fern::log_file(&log_path)
        .cli_with_context(|| format!("Failed to create log file '{}'", log_path.display()))?;
    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            let text = message.to_string();
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                console::strip_ansi_codes(&text)
            ))
        })
        .level(LevelFilter::Debug)
        .chain(log_file);

    fern::Dispatch::new()
        .level(console_level.max(LevelFilter::Debug))
        // HTTP client internals are noise at debug level
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("rustls", LevelFilter::Warn)
        .chain(Box::new(console) as Box<dyn log::Log>)
        .chain(file)
        .apply()
        .map_err(|e| CoreError::Io(io::Error::other(format!("Failed to install logger: {e}"))))?;

    Ok(log_path)
}
