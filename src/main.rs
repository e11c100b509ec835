use clap::Parser;
use pmp_cache_hierarchy::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run(&cli.global).await,
        Command::Query(args) => cli::query::run(&cli.global, args).await,
        Command::Ingest(args) => cli::ingest::run(&cli.global, args).await,
        Command::Clear(args) => cli::clear::run(&cli.global, args).await,
    }
}
