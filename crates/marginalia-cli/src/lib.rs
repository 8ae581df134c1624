//! Marginalia CLI library.
//!
//! Argument parsing, command execution and error types for the
//! `marginalia` binary.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Command, RunArgs};
pub use error::{CliError, Result};
