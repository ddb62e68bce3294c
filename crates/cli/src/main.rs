//! Questline CLI — the main entry point.
//!
//! Commands:
//! - `serve` — Start the HTTP gateway
//! - `chat`  — Run a single agent turn locally, no server

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "questline",
    about = "Questline — conversational job-search agent backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = "questline.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one message to the agent and print the reply
    Chat {
        /// The message to send
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = questline_config::AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Chat { message } => commands::chat::run(config, &message).await?,
    }

    Ok(())
}
