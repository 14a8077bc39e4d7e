// reelcut-cli/src/lib.rs
//
// Library portion of the Reelcut CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, RunArgs};
pub use commands::run::run_batch_command;
