//! Tokoku CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tokoku-cli migrate
//!
//! # Create a shop account
//! tokoku-cli user create -e owner@example.com -n "Warung Bu Sari" -p 'a long password'
//!
//! # Load demo products for an account
//! tokoku-cli seed inventory -e owner@example.com demo/inventory.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tokoku-cli")]
#[command(author, version, about = "Tokoku CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage shop accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Load demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an email/password account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Name shown in the dashboard
        #[arg(short, long, default_value = "")]
        name: String,

        /// Account password (at least 8 characters)
        #[arg(short, long, env = "TOKOKU_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Add the products listed in a YAML file to an account's inventory
    Inventory {
        /// Email of the account that owns the products
        #[arg(short, long)]
        email: String,

        /// YAML file with a list of products
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
            } => {
                commands::user::create(&email, &name, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Inventory { email, file } => {
                commands::seed::inventory(&email, &file).await?;
            }
        },
    }
    Ok(())
}
