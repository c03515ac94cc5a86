//! # Docent — personal knowledge-base assistant
//!
//! Answers questions about a fixed document corpus by retrieving the most
//! relevant chunks and asking an LLM to synthesize a grounded response.
//!
//! Usage:
//!   docent ingest                # chunk + embed the data dir, persist the index
//!   docent serve                 # start the HTTP gateway
//!   docent ask "Who is this?"    # one-shot question from the terminal

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docent_core::DocentConfig;
use docent_engine::Assistant;

#[derive(Parser)]
#[command(name = "docent", version, about = "Personal knowledge-base assistant")]
struct Cli {
    /// Path to config file (default: ~/.docent/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from the data directory and persist it
    Ingest,
    /// Start the HTTP gateway
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask a single question and print the answer
    Ask {
        question: String,
        /// Override the configured number of retrieved chunks
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "docent=debug,tower_http=debug"
    } else {
        "docent=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => DocentConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DocentConfig::load().context("loading config")?,
    };
    config.validate().context("validating config")?;

    match cli.command {
        Commands::Ingest => {
            let assistant = Assistant::new(config)?;
            let report = assistant.rebuild_from_data_dir().await?;
            println!(
                "Ingested {} document(s) into {} chunk(s)",
                report.documents, report.chunks
            );
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            let gateway_config = config.gateway.clone();
            let assistant = Arc::new(Assistant::new(config)?);

            match assistant.load_snapshot() {
                Ok(true) => {}
                Ok(false) => tracing::warn!("Serving without an index; queries will degrade"),
                Err(e) => tracing::warn!("Could not load index snapshot: {e}"),
            }
            let status = assistant.status();
            tracing::info!(
                "Starting: index_loaded={}, llm_configured={}, chunks={}",
                status.index_loaded,
                status.llm_configured,
                status.chunks
            );

            docent_gateway::start(&gateway_config, assistant).await?;
        }
        Commands::Ask { question, top_k } => {
            if let Some(k) = top_k {
                config.knowledge.top_k = k;
            }
            let assistant = Assistant::new(config)?;
            if !assistant.load_snapshot()? {
                tracing::warn!("No index snapshot found; run `docent ingest` first");
            }

            let answer = assistant.answer_query(&question).await?;
            println!("{}", answer.text);
            if !answer.sources.is_empty() {
                println!("\nSources: {}", answer.sources.join(", "));
            }
            if let Some(kind) = answer.failure {
                tracing::warn!("Answer degraded: {}", kind.as_str());
            }
        }
    }

    Ok(())
}
