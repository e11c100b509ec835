//! CLI for the cache hierarchy
//!
//! - `serve`: HTTP API server
//! - `query`: one-shot query through the hierarchy
//! - `ingest`: add files to the retrieval layer
//! - `clear`: clear one or all cache layers

pub mod clear;
pub mod ingest;
pub mod query;
pub mod serve;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Multi-layer query cache in front of pluggable LLM providers
#[derive(Parser)]
#[command(name = "pmp-cache-hierarchy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Clone, Default)]
pub struct GlobalArgs {
    /// Use in-memory stores, hashing embeddings and the dummy provider
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer one query through the cache hierarchy
    Query(query::QueryArgs),

    /// Add documents to the retrieval layer
    Ingest(ingest::IngestArgs),

    /// Clear cached answers
    Clear(clear::ClearArgs),
}

/// Loads configuration and installs logging; `quiet` drops to warn unless `RUST_LOG` is set
pub(crate) fn load_config(global: &GlobalArgs, quiet: bool) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load()?;
    let mut config = if global.offline {
        config.into_offline()
    } else {
        config
    };

    // One-shot commands keep stdout for their result
    if quiet && std::env::var("RUST_LOG").is_err() {
        config.logging.level = "warn".to_string();
    }

    logging::init_logging(&config.logging)?;
    Ok(config)
}
