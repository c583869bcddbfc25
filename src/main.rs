//! snipstack CLI entry point.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use snipstack_cli::cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_tracing();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
