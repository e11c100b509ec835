//! Clear command

use clap::Args;

use super::GlobalArgs;
use crate::domain::LayerKind;

#[derive(Args, Clone)]
pub struct ClearArgs {
    /// Layer to clear: 0 (exact), 1 (semantic) or 2 (retrieval); all when omitted
    #[arg(long)]
    pub layer: Option<String>,
}

pub async fn run(global: &GlobalArgs, args: ClearArgs) -> anyhow::Result<()> {
    let layer = args.layer.as_deref().map(str::parse::<LayerKind>).transpose()?;

    let config = super::load_config(global, true)?;
    let hierarchy = crate::build_hierarchy(&config)?;

    let report = hierarchy.clear_cache(layer).await?;
    for layer in report.cleared {
        println!("Cleared {}", layer);
    }

    Ok(())
}
