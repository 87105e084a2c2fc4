//! dayplanctl (dayplan) - CLI for the dayplan scheduler
//!
//! Adds, edits and removes tasks over the scheduler's HTTP API and renders
//! the computed schedule as a table.

use anyhow::Result;
use clap::Parser;

mod client;
mod commands;
mod config;
mod error;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Run the command
    if let Err(e) = cli.run().await {
        // Print error in a user-friendly way
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
