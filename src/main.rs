//! dealbot CLI entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dealbot::commands::{self, App};
use dealbot::config::{Config, LogFormat};

#[derive(Parser)]
#[command(name = "dealbot")]
#[command(about = "Amazon affiliate deal ingestion and catalog service")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "dealbot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the service: maintenance loop with periodic status reports
    Run,
    /// Add a product from a marketplace URL
    Add {
        /// Product page or short link
        url: String,
        /// Destination category; omitted shows what is available
        category: Option<String>,
    },
    /// Remove a product by category and 1-based index
    Remove { category: String, index: usize },
    /// List available categories
    Categories,
    /// Show the products in one category
    Products { category: String },
    /// List all products with their ids
    List,
    /// Create a category
    CategoryAdd { name: String },
    /// Remove a category and everything in it
    CategoryRemove {
        name: String,
        /// Pass `confirm` to delete a category that still owns products
        confirm: Option<String>,
    },
    /// Show user and catalog statistics
    Stats,
    /// Register a user, or refresh their activity when already known
    Register {
        /// Platform user id
        id: i64,
        /// Display name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    init_tracing(&config);

    let app = App::init(config).await?;

    match cli.command {
        Commands::Run => commands::run::run(&app).await?,
        Commands::Add { url, category } => {
            commands::ingest::add(&app, &url, category.as_deref()).await?
        }
        Commands::Remove { category, index } => {
            commands::ingest::remove(&app, &category, index).await?
        }
        Commands::Categories => commands::catalog::categories(&app).await?,
        Commands::Products { category } => commands::catalog::products(&app, &category).await?,
        Commands::List => commands::catalog::list(&app).await?,
        Commands::CategoryAdd { name } => commands::category::add(&app, &name).await?,
        Commands::CategoryRemove { name, confirm } => {
            let confirmed = confirm
                .as_deref()
                .is_some_and(|arg| arg.eq_ignore_ascii_case("confirm"));
            commands::category::remove(&app, &name, confirmed).await?
        }
        Commands::Stats => commands::stats::show(&app).await?,
        Commands::Register { id, name } => commands::user::register(&app, id, &name).await?,
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.directive()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
