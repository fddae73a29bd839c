//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use seedhost::commands;

/// Chat remote for a Transmission daemon on on-demand hosts
#[derive(Parser)]
#[command(
    name = "seedhost",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the Telegram bot
    Serve,

    /// Find a reachable Transmission host, provisioning one if needed
    Acquire,

    /// Queue a destroy run for the Transmission host
    Destroy,

    /// Print the magnet link of a .torrent file
    Magnet {
        /// Path to the .torrent file
        file: PathBuf,
    },

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            no_color,
            quiet,
            json,
            command,
        } = self;
        let ctx = seedhost::output::OutputContext::new(no_color, quiet);
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
            Command::Magnet { file } => commands::magnet::run(&file),
            Command::Serve => {
                let config = seedhost::infra::config::load()?;
                commands::serve::run(&ctx, &config).await
            }
            Command::Acquire => {
                let config = seedhost::infra::config::load()?;
                commands::acquire::run(&ctx, &config, json).await
            }
            Command::Destroy => {
                let config = seedhost::infra::config::load()?;
                commands::destroy::run(&ctx, &config).await
            }
        }
    }
}
