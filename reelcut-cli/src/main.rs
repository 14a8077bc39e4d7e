// ============================================================================
// reelcut-cli/src/main.rs
// ============================================================================
//
// REELCUT CLI: Main Entry Point
//
// Parses the command line, installs logging, runs the requested command and
// turns its result into the process exit code:
//
// - 0: every clip was published
// - 1: the batch could not run (bad configuration, missing source or tool,
//      failed scene detection)
// - 2: the batch ran but at least one clip failed or was cancelled
//
// AI-ASSISTANT-INFO: Entry point for the reelcut binary

// ---- Internal crate imports ----
use reelcut_cli::{Cli, Commands, logging, run_batch_command, terminal};

// ---- External crate imports ----
use clap::Parser;
use console::style;
use log::debug;
use reelcut_core::CoreError;

// ---- Standard library imports ----
use std::path::PathBuf;
use std::process;

const EXIT_FATAL: i32 = 1;
const EXIT_PARTIAL: i32 = 2;

fn suggestion_for(error: &CoreError) -> Option<&'static str> {
    match error {
        CoreError::DependencyNotFound(_) => {
            Some("Install ffmpeg (and yt-dlp for --url) and make sure they are on PATH")
        }
        CoreError::InvalidConfiguration(_) => Some("Check the command-line flags and REELCUT_* variables"),
        CoreError::SceneDetectionFailed(_) => Some("Check that the input is a readable video file"),
        _ => None,
    }
}

fn main() {
    let cli = Cli::parse();

    let Commands::Run(args) = cli.command;
    let log_dir = args.log_dir.clone().unwrap_or_else(|| PathBuf::from("logs"));
    let log_path = match logging::init_logging(cli.verbose, &log_dir) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold().for_stderr(), e);
            process::exit(EXIT_FATAL);
        }
    };
    debug!("Run started: {}", chrono::Local::now());

    let code = match run_batch_command(args, cli.verbose, &log_path) {
        Ok(report) if report.is_complete_success() => 0,
        Ok(_) => EXIT_PARTIAL,
        Err(e) => {
            terminal::print_error("Batch failed", &e.to_string(), suggestion_for(&e));
            EXIT_FATAL
        }
    };

    debug!("Finished at: {}", chrono::Local::now());
    log::logger().flush();
    process::exit(code);
}
