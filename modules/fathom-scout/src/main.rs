use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fathom_common::{Config, DomainProfile};
use fathom_scout::pipeline::{Pipeline, PipelinePaths};

/// Account discovery: classify seeds, extract the following graph, detect
/// communities, and rank candidates across strategies.
#[derive(Parser, Debug)]
#[command(name = "fathom-scout")]
struct Args {
    /// Seed profiles (JSON array).
    #[arg(long)]
    seeds: PathBuf,

    /// Raw following capture to replay through the snapshot provider.
    #[arg(long, conflicts_with = "relationships")]
    capture: Option<PathBuf>,

    /// Relationship snapshot(s) from earlier runs; merged when repeated.
    #[arg(long)]
    relationships: Vec<PathBuf>,

    /// Content-strategy score document.
    #[arg(long)]
    content_scores: Option<PathBuf>,

    /// Engagement-strategy score document.
    #[arg(long)]
    engagement_scores: Option<PathBuf>,

    /// Output directory for run artifacts.
    #[arg(long, default_value = "data")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fathom=info".parse()?))
        .init();

    info!("Fathom Scout starting...");

    let args = Args::parse();
    let config = Config::from_env();
    let pipeline = Pipeline::new(config, DomainProfile::ai_research());

    let summary = pipeline
        .run(&PipelinePaths {
            seeds: args.seeds,
            capture: args.capture,
            relationships: args.relationships,
            content_scores: args.content_scores,
            engagement_scores: args.engagement_scores,
            out_dir: args.out,
        })
        .await?;

    info!("Discovery run complete. {summary}");
    Ok(())
}
