mod api;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, DEFAULT_LOG_FILTER};
use crate::models::StatKind;
use crate::services::FilterConfig;

#[derive(Parser)]
#[command(name = "league")]
#[command(about = "Youth football league manager: fixtures, results, standings and statistics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ScopeArgs {
    #[arg(short, long)]
    category: Option<String>,
    #[arg(short, long)]
    group: Option<String>,
    #[arg(long)]
    championship: Option<String>,
    #[arg(short, long)]
    search: Option<String>,
}

impl ScopeArgs {
    fn filter(self) -> FilterConfig {
        let mut filter = FilterConfig::default();
        if let Some(category) = self.category {
            filter = filter.category(category);
        }
        if let Some(group) = self.group {
            filter = filter.group(group);
        }
        if let Some(championship) = self.championship {
            filter = filter.championship(championship);
        }
        if let Some(search) = self.search {
            filter = filter.search(search);
        }
        filter
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Initialize the database
    InitDb,
    /// Load the demo league into an empty database
    Seed {
        /// Delete all existing data first
        #[arg(long)]
        reset: bool,
    },
    /// Rebuild every standings table from played matches
    Recalculate,
    /// Print standings tables
    Standings(ScopeArgs),
    /// Print the top scorers
    Scorers(ScopeArgs),
    /// Print the yellow card leaders
    Cards(ScopeArgs),
    /// Query a team by name
    Team {
        #[arg(short, long)]
        name: String,
    },
    /// Export standings to CSV
    Export {
        #[arg(short, long, default_value = "standings.csv")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting league API server on port {}", port.unwrap_or(config.port));
            api::serve(&config, port).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            db::init_database(&config.database_url).await?;
        }
        Some(Commands::Seed { reset }) => {
            cli::seed(&config, reset).await?;
        }
        Some(Commands::Recalculate) => {
            cli::recalculate(&config).await?;
        }
        Some(Commands::Standings(scope)) => {
            cli::show_standings(&config, &scope.filter()).await?;
        }
        Some(Commands::Scorers(scope)) => {
            cli::show_leaders(&config, StatKind::Goal, &scope.filter()).await?;
        }
        Some(Commands::Cards(scope)) => {
            cli::show_leaders(&config, StatKind::YellowCard, &scope.filter()).await?;
        }
        Some(Commands::Team { name }) => {
            tracing::info!("Querying team: {}", name);
            cli::query_team(&config, &name).await?;
        }
        Some(Commands::Export { out }) => {
            cli::export_standings(&config, &out).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting league API server on port {}", config.port);
            api::serve(&config, None).await?;
        }
    }

    Ok(())
}
