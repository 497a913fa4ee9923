//! Otechestvo CLI - news management and configuration checks.
//!
//! # Usage
//!
//! ```bash
//! # List local news, newest first
//! otechestvo-cli news list
//!
//! # Add, edit and remove news items
//! otechestvo-cli news add --date 01.09.2024 --content "Открытие сезона"
//! otechestvo-cli news edit 1725148800000 --date 02.09.2024
//! otechestvo-cli news remove 1725148800000
//!
//! # Show effective configuration and secret warnings
//! otechestvo-cli config check
//! ```
//!
//! The news file location comes from `DATA_DIR` (or `.env`) unless
//! `--data-dir` is given.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use otechestvo_site::config::SiteConfig;
use otechestvo_site::store::NewsStore;

mod commands;

#[derive(Parser)]
#[command(name = "otechestvo-cli")]
#[command(author, version, about = "Otechestvo site tools")]
struct Cli {
    /// Directory holding news.json (overrides DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage local news items
    News {
        #[command(subcommand)]
        action: NewsAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum NewsAction {
    /// List news items, newest first
    List,
    /// Create a news item
    Add {
        /// Display date, e.g. 01.09.2024
        #[arg(short, long)]
        date: String,

        /// News text
        #[arg(short, long)]
        content: String,
    },
    /// Change the date and/or text of a news item
    Edit {
        /// News item id
        id: String,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete a news item
    Remove {
        /// News item id
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print effective settings and warn about weak or default secrets
    Check,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "otechestvo_cli=info,otechestvo_site=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SiteConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    match cli.command {
        Commands::News { action } => {
            let store = NewsStore::open(&config.data_dir).await?;
            match action {
                NewsAction::List => {
                    for item in commands::news::list(&store).await? {
                        println!("{}", commands::news::format_item(&item));
                    }
                }
                NewsAction::Add { date, content } => {
                    let item = commands::news::add(&store, &date, &content).await?;
                    println!("{}", item.id);
                }
                NewsAction::Edit { id, date, content } => {
                    let item = commands::news::edit(&store, &id, date, content).await?;
                    println!("{}", commands::news::format_item(&item));
                }
                NewsAction::Remove { id } => {
                    commands::news::remove(&store, &id).await?;
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Check => {
                for (name, value) in commands::config::describe(&config) {
                    println!("{name}={value}");
                }
                let warnings = config.secret_warnings();
                for warning in &warnings {
                    tracing::warn!("{warning}");
                }
                if warnings.is_empty() {
                    tracing::info!("configuration looks good");
                }
            }
        },
    }
    Ok(())
}
