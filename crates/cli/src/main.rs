//! Rjukan Stays CLI - Database migrations and store maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run PostgreSQL migrations
//! stays-cli migrate
//!
//! # Copy a JSON data directory into PostgreSQL
//! stays-cli import --data-dir ./data
//!
//! # Read or change a setting in the configured store
//! stays-cli setting get admin_email
//! stays-cli setting set admin_email host@rentinrjukan.com
//!
//! # List bookings in the configured store
//! stays-cli bookings --status pending
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `import` - Import a file store into `PostgreSQL`
//! - `setting` - Read and write settings
//! - `bookings` - List bookings

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "stays-cli")]
#[command(author, version, about = "Rjukan Stays CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run `PostgreSQL` migrations
    Migrate,
    /// Copy a JSON data directory into `PostgreSQL`
    Import {
        /// Directory holding bookings.json, blocked-dates.json and settings.json
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,
    },
    /// Read or write settings
    Setting {
        #[command(subcommand)]
        action: SettingAction,
    },
    /// List bookings
    Bookings {
        /// Only show bookings with this status (pending, approved, denied)
        #[arg(short, long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingAction {
    /// Print a setting's value
    Get {
        /// Setting key
        key: String,
    },
    /// Create or replace a setting
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Import { data_dir } => commands::import::run(&data_dir).await?,
        Commands::Setting { action } => match action {
            SettingAction::Get { key } => commands::settings::get(&key).await?,
            SettingAction::Set { key, value } => commands::settings::set(&key, &value).await?,
        },
        Commands::Bookings { status } => commands::bookings::list(status.as_deref()).await?,
    }
    Ok(())
}
