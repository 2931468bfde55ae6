//! CargoLens CLI - cargo-image tagging and Arabic search-query analysis.
//!
//! # Usage
//!
//! ```bash
//! # Tag and caption a cargo photo
//! cargolens analyze truck.jpg
//!
//! # Interpret an Arabic search query
//! cargolens query "وظيفة سائق في الرياض"
//!
//! # Rank candidate documents against a query
//! cargolens rank --query "نقل أثاث" --docs candidates.txt -k 5
//!
//! # Manage models and configuration
//! cargolens models download
//! cargolens config show
//! ```
//!
//! Data payloads go to stdout. Any unrecoverable failure prints a
//! `{"error": "..."}` payload to stderr and exits with status 1.

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// CargoLens - cargo-image tagging and search-query analysis.
#[derive(Parser, Debug)]
#[command(name = "cargolens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a cargo image: category tags plus a caption
    Analyze(cli::analyze::AnalyzeArgs),

    /// Interpret an Arabic search query into structured filters
    Query(cli::query::QueryArgs),

    /// Rank candidate documents by semantic similarity to a query
    Rank(cli::rank::RankArgs),

    /// Manage AI models (download, list, etc.)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI overrides.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match cargolens_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `cargolens config path`."
            );
            cargolens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("CargoLens v{}", cargolens_core::VERSION);

    let result = match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, &config).await,
        Commands::Query(args) => cli::query::execute(args, &config),
        Commands::Rank(args) => cli::rank::execute(args, &config),
        Commands::Models(args) => cli::models::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args),
    };

    // One error contract for every subcommand: a structured JSON payload on
    // stderr and a non-zero exit status. (The upstream scripts disagreed on
    // this between the two tools; unified here.)
    if let Err(e) = result {
        let payload = cargolens_core::ErrorPayload::new(format!("{e:#}"));
        match serde_json::to_string(&payload) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("{{\"error\":\"{e}\"}}"),
        }
        std::process::exit(1);
    }
}
