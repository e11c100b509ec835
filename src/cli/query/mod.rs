//! Query command - one-shot lookup through the hierarchy

use clap::Args;

use super::GlobalArgs;
use crate::domain::QueryOutcome;

#[derive(Args, Clone)]
pub struct QueryArgs {
    /// Query text
    pub text: String,

    /// Generation provider to use on a miss
    #[arg(long)]
    pub provider: Option<String>,

    /// Print the full outcome as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(global: &GlobalArgs, args: QueryArgs) -> anyhow::Result<()> {
    let config = super::load_config(global, true)?;
    let hierarchy = crate::build_hierarchy(&config)?;

    let outcome = hierarchy.query(&args.text, args.provider.as_deref()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.response);
        eprintln!("{}", summary(&outcome));
    }

    Ok(())
}

fn summary(outcome: &QueryOutcome) -> String {
    let source = match (&outcome.cache_layer, &outcome.llm_provider) {
        (Some(layer), _) if !outcome.llm_called => layer.to_string(),
        (Some(layer), Some(provider)) => format!("{} via {}", layer, provider),
        (_, Some(provider)) => format!("generated by {}", provider),
        _ => "unknown".to_string(),
    };

    format!("[{} in {:.3}s]", source, outcome.elapsed_time)
}
