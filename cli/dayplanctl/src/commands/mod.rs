//! CLI commands.

mod schedule;
mod tasks;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::ApiClient;
use crate::config::Config;
use crate::output::OutputFormat;

/// dayplan CLI - Plan tasks across days on the dayplan scheduler.
#[derive(Debug, Parser)]
#[command(name = "dayplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Scheduler API URL.
    #[arg(long, global = true, env = "DAYPLAN_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the computed schedule.
    Schedule(schedule::ScheduleCommand),

    /// Manage tasks.
    Tasks(tasks::TasksCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?.with_api_url(self.api_url);

        let ctx = CommandContext {
            config,
            format: self.format,
        };

        match self.command {
            Commands::Schedule(cmd) => cmd.run(ctx).await,
            Commands::Tasks(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("dayplan {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Get an API client.
    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.config)
    }
}
