//! Marginalia - extract case-focused insights from folders of PDF documents.

use clap::Parser;
use marginalia_cli::{commands, Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> marginalia_cli::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => commands::execute_run(args).await?,
    }

    Ok(())
}
