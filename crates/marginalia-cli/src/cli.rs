//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Marginalia - extract case-focused insights from PDF documents.
#[derive(Debug, Parser)]
#[command(name = "marginalia")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run insight extraction over a folder of documents
    Run(RunArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Folder containing PDF documents
    #[arg(long, default_value = "documents")]
    pub documents: PathBuf,

    /// Folder for report artifacts
    #[arg(long, default_value = "output")]
    pub output: PathBuf,

    /// JSON file of named cases
    #[arg(long, default_value = "inputs/cases.json")]
    pub cases: PathBuf,

    /// Model identifier to request completions from
    #[arg(long, default_value = "gpt-4o-mini")]
    pub model: String,

    /// Pipeline configuration TOML file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the timestamped output subfolder
    #[arg(long)]
    pub no_timestamp: bool,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Completion API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub endpoint: Option<String>,
}
