//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `run` command.
/// This command splits one source video into clips and schedules them.
pub mod run;
