//! `chai-menu` inspection tool
//!
//! Fetches the signed-in user's menu from the console API and prints the
//! derived navigation tree, route list or breadcrumb as JSON.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use anyhow::Context;
use chai_client::HttpMenuService;
use chai_core::{ConsoleConfig, init_logging};
use chai_router::{MenuStore, ViewRegistry};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

/// Command line interface for the menu inspection tool
#[derive(Parser)]
#[command(
    name = "chai-menu",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect the permission-driven menu of the Chai admin console"
)]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, value_name = "FILE", default_value = "console")]
    config: String,

    /// Override the API base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Bearer token for the API
    #[arg(long, env = "CHAI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Deepest menu tree level to keep
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<usize>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Print the navigation tree, home entry first
    Tree,

    /// Print the materialized route list
    Routes,

    /// Print the ancestry of a route path
    Breadcrumb {
        /// Route path to look up
        #[arg(value_name = "PATH")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConsoleConfig::load_from(&cli.config).context("failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(token) = cli.token {
        config.api.token = Some(token);
    }
    if let Some(max_depth) = cli.max_depth {
        config.router.max_depth = max_depth;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "chai-menu starting");

    let service = HttpMenuService::from_config(&config.api)?;
    let store = MenuStore::new(Arc::new(service), ViewRegistry::new(), &config.router);
    store
        .load_menu_data(false)
        .await
        .context("failed to load menu data")?;

    let output = match cli.command {
        Commands::Tree => serde_json::to_string_pretty(&store.menu_tree())?,
        Commands::Routes => serde_json::to_string_pretty(store.dynamic_routes().as_ref())?,
        Commands::Breadcrumb { path } => {
            serde_json::to_string_pretty(&store.get_breadcrumb(&path))?
        }
    };
    println!("{output}");
    Ok(())
}
