//! End-to-end discovery pipeline.
//!
//! Strictly sequential stages, each consuming the complete output of the
//! previous one and writing a self-contained JSON artifact: classify seeds,
//! extract relationships (or reload a snapshot), build the weighted graph,
//! detect communities and bridges, fuse strategy scores into the final
//! ranked list.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use fathom_common::{AccountProfile, Config, DomainProfile};
use fathom_discovery::{
    classify_seeds, FollowingExtractor, RelationshipSnapshot, SnapshotProvider,
};
use fathom_graph::{AccountGraph, CommunityDetector};
use fathom_ranking::{load_strategy_scores, CandidateScore, UnifiedScorer};

use crate::run_log::{EventKind, RunLog};

/// Input/output locations for one run.
#[derive(Debug, Clone)]
pub struct PipelinePaths {
    /// Seed profiles (JSON array of account profiles).
    pub seeds: PathBuf,
    /// Raw following capture to replay through the snapshot provider.
    pub capture: Option<PathBuf>,
    /// Previously written relationship snapshots to rebuild from instead.
    pub relationships: Vec<PathBuf>,
    pub content_scores: Option<PathBuf>,
    pub engagement_scores: Option<PathBuf>,
    pub out_dir: PathBuf,
}

/// Final ranked artifact record: the full scoring trace plus display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedAccount {
    pub handle: String,
    pub display_name: String,
    pub raw: [Option<f64>; 3],
    pub normalized: [Option<f64>; 3],
    pub num_sources: u32,
    pub weighted_sum: f64,
    pub final_score: f64,
}

#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub seeds: u32,
    pub relationships: u32,
    pub nodes: u32,
    pub edges: u32,
    pub communities: u32,
    pub bridges: u32,
    pub candidates: u32,
}

impl std::fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Discovery Run Complete ===")?;
        writeln!(f, "Seeds:          {}", self.seeds)?;
        writeln!(f, "Relationships:  {}", self.relationships)?;
        writeln!(f, "Graph:          {} nodes, {} edges", self.nodes, self.edges)?;
        writeln!(f, "Communities:    {}", self.communities)?;
        writeln!(f, "Bridges:        {}", self.bridges)?;
        writeln!(f, "Candidates:     {}", self.candidates)?;
        Ok(())
    }
}

pub struct Pipeline {
    config: Config,
    domain: DomainProfile,
}

impl Pipeline {
    pub fn new(config: Config, domain: DomainProfile) -> Self {
        Self { config, domain }
    }

    pub async fn run(&self, paths: &PipelinePaths) -> Result<PipelineSummary> {
        std::fs::create_dir_all(&paths.out_dir)
            .with_context(|| format!("creating {}", paths.out_dir.display()))?;
        let mut run_log = RunLog::new();
        let mut summary = PipelineSummary::default();

        // --- Stage 1: tier classification ---

        let profiles: Vec<AccountProfile> = read_json(&paths.seeds).context("reading seeds")?;
        let total = profiles.len() as u32;
        let seeds = classify_seeds(&profiles, &self.domain);
        if seeds.is_empty() {
            bail!("no seed account matched any tier signal");
        }
        run_log.record(EventKind::SeedsClassified {
            classified: seeds.len() as u32,
            no_signal: total - seeds.len() as u32,
        });
        summary.seeds = seeds.len() as u32;
        write_json(&paths.out_dir.join("seeds.json"), &seeds)?;

        // --- Stage 2: relationship extraction or snapshot reload ---

        let snapshot = if let Some(capture) = &paths.capture {
            let provider = Arc::new(SnapshotProvider::from_path(capture)?);
            let extractor = FollowingExtractor::new(provider, &self.config);
            let output = extractor.extract(&seeds).await;
            info!("{}", output.stats);
            run_log.record(EventKind::RelationshipsExtracted {
                seeds: output.stats.seeds_attempted,
                relationships: output.stats.relationships_kept,
                filtered: output.stats.total_filtered(),
                budget_exhausted: output.stats.budget_exhausted,
                permission_denied: output.stats.permission_denied,
            });
            RelationshipSnapshot::new(output.relationships, output.profiles)
        } else {
            if paths.relationships.is_empty() {
                bail!("either a capture or at least one relationship snapshot is required");
            }
            let snapshots = paths
                .relationships
                .iter()
                .map(|p| RelationshipSnapshot::read(p))
                .collect::<Result<Vec<_>, _>>()?;
            let merged = RelationshipSnapshot::merge(snapshots);
            run_log.record(EventKind::SnapshotLoaded {
                files: paths.relationships.len() as u32,
                relationships: merged.relationships.len() as u32,
            });
            merged
        };
        summary.relationships = snapshot.relationships.len() as u32;
        snapshot.write(&paths.out_dir.join("relationships.json"))?;

        // --- Stage 3: graph construction + metrics ---

        let graph = AccountGraph::build(&snapshot.relationships, &snapshot.profiles)?;
        let metrics = graph.metrics(&snapshot.relationships);
        run_log.record(EventKind::GraphBuilt {
            nodes: graph.graph.node_count() as u32,
            edges: graph.graph.edge_count() as u32,
            pagerank_converged: metrics.pagerank_converged,
            pagerank_iterations: metrics.pagerank_iterations,
        });
        summary.nodes = graph.graph.node_count() as u32;
        summary.edges = graph.graph.edge_count() as u32;
        write_json(&paths.out_dir.join("graph_metrics.json"), &metrics)?;
        write_json(&paths.out_dir.join("graph_export.json"), &graph.export())?;

        // --- Stage 4: community detection + bridges ---

        let detector = CommunityDetector::new(&self.config);
        let communities = detector.detect(&graph, &metrics, &self.domain);
        run_log.record(EventKind::CommunitiesDetected {
            communities: communities.communities.len() as u32,
            method: communities.method.to_string(),
            modularity: communities.modularity,
            bridges: communities.bridges.len() as u32,
        });
        summary.communities = communities.communities.len() as u32;
        summary.bridges = communities.bridges.len() as u32;
        write_json(&paths.out_dir.join("communities.json"), &communities.communities)?;
        write_json(
            &paths.out_dir.join("community_assignments.json"),
            &communities.assignments,
        )?;
        write_json(&paths.out_dir.join("bridges.json"), &communities.bridges)?;

        // --- Stage 5: unified scoring ---

        let graph_scores: BTreeMap<String, f64> = metrics
            .nodes
            .iter()
            .map(|(handle, m)| (handle.clone(), m.pagerank))
            .collect();
        let content_scores = match &paths.content_scores {
            Some(path) => load_strategy_scores(path)?,
            None => BTreeMap::new(),
        };
        let engagement_scores = match &paths.engagement_scores {
            Some(path) => load_strategy_scores(path)?,
            None => BTreeMap::new(),
        };

        let scorer = UnifiedScorer::new(&self.config);
        let (candidates, stats) =
            scorer.score([&graph_scores, &content_scores, &engagement_scores])?;
        run_log.record(EventKind::Ranked {
            candidates: stats.candidates,
            multi_source: stats.multi_source,
        });
        summary.candidates = stats.candidates;

        let names: BTreeMap<&str, &str> = graph
            .graph
            .node_indices()
            .map(|idx| {
                let node = &graph.graph[idx];
                (node.handle.as_str(), node.display_name.as_str())
            })
            .collect();
        let ranked: Vec<RankedAccount> = candidates
            .into_iter()
            .map(|c| to_ranked(c, &names))
            .collect();
        write_json(&paths.out_dir.join("ranked.json"), &ranked)?;

        run_log.write(&paths.out_dir.join("run.json"))?;
        Ok(summary)
    }
}

fn to_ranked(candidate: CandidateScore, names: &BTreeMap<&str, &str>) -> RankedAccount {
    RankedAccount {
        display_name: names
            .get(candidate.handle.as_str())
            .map(|n| n.to_string())
            .unwrap_or_default(),
        handle: candidate.handle,
        raw: candidate.raw,
        normalized: candidate.normalized,
        num_sources: candidate.num_sources,
        weighted_sum: candidate.weighted_sum,
        final_score: candidate.final_score,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
