//! Ingest command - adds files to the retrieval layer in one batch

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use futures::future::try_join_all;
use serde_json::{Map, Value};

use super::GlobalArgs;
use crate::domain::NewDocument;

#[derive(Args, Clone)]
pub struct IngestArgs {
    /// Text files to ingest
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// JSON object merged into every document's metadata
    #[arg(long)]
    pub metadata: Option<String>,
}

pub async fn run(global: &GlobalArgs, args: IngestArgs) -> anyhow::Result<()> {
    let config = super::load_config(global, true)?;
    let metadata = parse_metadata(args.metadata.as_deref())?;
    let documents = read_documents(&args.files, &metadata).await?;

    let hierarchy = crate::build_hierarchy(&config)?;
    let ids = hierarchy.add_documents_batch(documents).await?;

    for id in &ids {
        println!("{}", id);
    }
    eprintln!("Added {} documents to RAG cache", ids.len());

    Ok(())
}

/// Reads every file concurrently; the first unreadable file fails the batch
async fn read_documents(
    files: &[PathBuf],
    metadata: &Map<String, Value>,
) -> anyhow::Result<Vec<NewDocument>> {
    try_join_all(files.iter().map(|path| async move {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok::<_, anyhow::Error>(document_for(path, content, metadata))
    }))
    .await
}

fn parse_metadata(raw: Option<&str>) -> anyhow::Result<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(raw) => match serde_json::from_str(raw).context("--metadata must be JSON")? {
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!("--metadata must be a JSON object"),
        },
    }
}

fn document_for(path: &std::path::Path, content: String, metadata: &Map<String, Value>) -> NewDocument {
    let mut document = NewDocument::new(content);
    document.metadata = metadata.clone();
    document
        .metadata
        .entry("source")
        .or_insert_with(|| Value::String(path.display().to_string()));
    document
}
