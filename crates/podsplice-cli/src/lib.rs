//! Command-line front end for the podsplice editing engine.
//!
//! This crate provides:
//! - Argument parsing for the `cut`, `plan` and `trim-silences` subcommands
//! - Settings from `SPLICE_*` environment variables
//! - Exit status mapping for engine errors

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Command};
pub use config::SpliceSettings;
pub use error::{diagnostic_for, exit_code_for, CliError, CliResult};
