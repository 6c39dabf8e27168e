use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod config;
mod sub_commands;

use crate::config::Settings;

/// Command line tool for the checkout components core
#[derive(Parser)]
#[command(name = "checkout-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long, env = "CHECKOUT_CONFIG")]
    config: Option<PathBuf>,
    /// Logging level, overrides the settings
    #[arg(short, long)]
    log_level: Option<Level>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the status of a payment until it is final
    PollStatus(sub_commands::poll_status::PollStatusSubCommand),
    /// Set up a session and print its configuration
    SessionSetup(sub_commands::session_setup::SessionSetupSubCommand),
    /// Validate payment details offline
    Validate(sub_commands::validate::ValidateSubCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();
    let settings = Settings::new(args.config.as_deref())?;

    let default_filter = match args.log_level {
        Some(level) => level.to_string(),
        None => settings.log_level.clone(),
    };
    let reqwest_filter = "reqwest=warn,hyper=warn";
    let env_filter = EnvFilter::new(format!("{default_filter},{reqwest_filter}"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match &args.command {
        Commands::PollStatus(sub_command_args) => {
            sub_commands::poll_status::poll_status(&settings, sub_command_args).await
        }
        Commands::SessionSetup(sub_command_args) => {
            sub_commands::session_setup::session_setup(&settings, sub_command_args).await
        }
        Commands::Validate(sub_command_args) => {
            sub_commands::validate::validate(&settings, sub_command_args)
        }
    }
}
