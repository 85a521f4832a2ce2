//! RAGScope CLI: terminal control panel for a remote RAG pipeline.
//!
//! Provides both one-shot and interactive TUI modes.

mod oneshot;
mod tui;

use clap::Parser;
use ragscope_core::render::TextOptions;
use ragscope_core::{ConfigOverrides, Protocol};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// RAGScope: inspect every stage of a Retrieval-Augmented-Generation pipeline
#[derive(Parser, Debug)]
#[command(name = "ragscope", version, about, long_about = None)]
struct Cli {
    /// Question to run once (starts the interactive panel if omitted)
    query: Option<String>,

    /// Chunk size in characters (50-800)
    #[arg(long)]
    chunk_size: Option<u32>,

    /// Overlap between consecutive chunks (0-300)
    #[arg(long)]
    chunk_overlap: Option<u32>,

    /// Number of chunks to retrieve (1-12)
    #[arg(short = 'k', long)]
    top_k: Option<u32>,

    /// Request protocol: two_phase or single_phase
    #[arg(short, long)]
    protocol: Option<Protocol>,

    /// Base URL of the RAG backend
    #[arg(short, long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the merged result as JSON (one-shot mode)
    #[arg(long)]
    json: bool,

    /// Print full document bodies (one-shot mode)
    #[arg(long)]
    expand_documents: bool,

    /// Print every similarity score (one-shot mode)
    #[arg(long)]
    expand_scores: bool,

    /// Workspace directory (for .ragscope/config.toml)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Collect the flags the user actually passed as config overrides.
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(url) = &self.base_url {
            overrides.set("backend", "base_url", url.as_str());
        }
        if let Some(protocol) = self.protocol {
            overrides.set("backend", "protocol", protocol.to_string());
        }
        if let Some(timeout) = self.timeout {
            overrides.set("backend", "timeout_secs", timeout);
        }
        if let Some(value) = self.chunk_size {
            overrides.set("defaults", "chunk_size", value);
        }
        if let Some(value) = self.chunk_overlap {
            overrides.set("defaults", "chunk_overlap", value);
        }
        if let Some(value) = self.top_k {
            overrides.set("defaults", "top_k", value);
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let interactive = cli.query.is_none();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr (off while the TUI owns the terminal)
    let stderr_layer = (!interactive).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(EnvFilter::new(filter))
    });

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "ragscope", "ragscope")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "ragscope.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    // Load configuration
    let overrides = cli.overrides();
    let config = ragscope_core::load_config(Some(&workspace), Some(overrides.as_dict()))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    tracing::debug!(
        endpoint = %config.backend.endpoint_url(),
        protocol = %config.backend.protocol,
        "Configuration loaded"
    );

    match &cli.query {
        Some(query) => {
            let options = oneshot::OutputOptions {
                json: cli.json,
                text: TextOptions {
                    expand_documents: cli.expand_documents,
                    expand_scores: cli.expand_scores,
                },
            };
            oneshot::run(query, &config, options).await
        }
        None => {
            for warning in config.defaults.validate() {
                tracing::warn!("{}", warning);
            }
            tui::run(config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
