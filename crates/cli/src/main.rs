//! House Price Predictor CLI
//!
//! A command-line client for requesting price predictions and browsing
//! prediction history on the house price service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{history, model, predictions};

/// House Price Predictor CLI
#[derive(Parser)]
#[command(name = "hpp")]
#[command(author, version, about = "CLI for the House Price Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via HPP_API_URL env var)
    #[arg(long, env = "HPP_API_URL")]
    pub api_url: Option<String>,

    /// User id sent as x-user-id (can also be set via HPP_USER env var)
    #[arg(long, short, env = "HPP_USER")]
    pub user: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the price of a house
    Predict(predictions::PredictArgs),

    /// List your predictions, newest first
    History {
        /// Page number, starting at 1
        #[arg(long, short, default_value_t = 1)]
        page: usize,
    },

    /// Show a single prediction
    Show {
        /// Prediction ID
        id: u64,
    },

    /// Delete one of your predictions
    Delete {
        /// Prediction ID
        id: u64,
    },

    /// Show statistics over your recent predictions
    Dashboard,

    /// Show the loaded model's metadata
    Model,
}

impl Commands {
    fn needs_user(&self) -> bool {
        !matches!(self, Commands::Model)
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;

    let api_url = config.resolve_api_url(cli.api_url);
    let user = config.resolve_user(cli.user);
    let format = config.resolve_format(cli.format);

    if cli.command.needs_user() && user.is_none() {
        anyhow::bail!("No user id given: pass --user or set HPP_USER");
    }

    let client = client::ApiClient::new(&api_url, user)
        .with_context(|| format!("Cannot use API URL {}", api_url))?;

    match cli.command {
        Commands::Predict(args) => predictions::predict(&client, &args, format).await?,
        Commands::History { page } => history::show_history(&client, page, format).await?,
        Commands::Show { id } => predictions::show_prediction(&client, id, format).await?,
        Commands::Delete { id } => predictions::delete_prediction(&client, id).await?,
        Commands::Dashboard => history::show_dashboard(&client, format).await?,
        Commands::Model => model::show_model(&client, format).await?,
    }

    Ok(())
}
