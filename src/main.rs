use std::path::PathBuf;

use binclient::ServiceKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Config;

/// Create and retrieve pastes on public paste services
#[derive(Parser)]
#[command(name = "binclient", version)]
struct Cli {
    /// Config file (defaults to config.toml in the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a paste and print its id and URL
    Create {
        /// haste, ghostbin, ivanbin or sourcebin
        service: ServiceKind,
        /// Read the paste from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Language id (ghostbin only)
        #[arg(short, long)]
        language: Option<String>,
        /// Expiry such as `10m` or `never` (ghostbin only)
        #[arg(short, long)]
        expire: Option<String>,
    },
    /// Download a paste and print its body
    Retrieve {
        service: ServiceKind,
        id: String,
        /// Print every field of the paste as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Create {
            service,
            file,
            language,
            expire,
        } => commands::create::run(
            &config,
            service,
            file.as_deref(),
            language.as_deref(),
            expire.as_deref(),
        ),
        Command::Retrieve { service, id, json } => {
            commands::retrieve::run(&config, service, &id, json)
        }
    }
}
