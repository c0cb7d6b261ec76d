//! Community detection over the account graph.
//!
//! Primary method is greedy weighted-modularity optimization (Louvain
//! style). If it degenerates the detector falls back to label propagation,
//! then to weakly-connected components; whichever method actually ran is
//! recorded in the result. Near-zero modularity is a diagnostic, not an
//! error: tiny or highly consensual graphs simply lack community
//! structure.

mod bridge;
mod characterize;
mod components;
mod label_prop;
mod louvain;

use std::collections::BTreeMap;

use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fathom_common::{Config, DomainProfile};

use crate::build::{AccountGraph, GraphMetrics};

pub use bridge::detect_bridges;
pub use characterize::characterize;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    pub fn for_size(size: usize) -> Self {
        match size {
            0..=3 => SizeBucket::Small,
            4..=10 => SizeBucket::Medium,
            _ => SizeBucket::Large,
        }
    }
}

impl std::fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeBucket::Small => write!(f, "small"),
            SizeBucket::Medium => write!(f, "medium"),
            SizeBucket::Large => write!(f, "large"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: usize,
    pub members: Vec<String>,
    pub size: usize,
    pub size_bucket: SizeBucket,
    pub verification_rate: f64,
    pub avg_followers: f64,
    pub seed_count: u32,
    /// Seed members per tier, [tier1, tier2, tier3].
    pub tier_counts: [u32; 3],
    pub internal_edges: u32,
    pub external_edges: u32,
    pub topics: Vec<String>,
    pub representatives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeAccount {
    pub handle: String,
    /// Community id → count of edges connecting to that community.
    pub community_links: BTreeMap<usize, u32>,
    pub bridge_score: f64,
    pub is_global_bridge: bool,
    pub is_local_bridge: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    WeightedModularity,
    LabelPropagation,
    ConnectedComponents,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionMethod::WeightedModularity => write!(f, "weighted_modularity"),
            DetectionMethod::LabelPropagation => write!(f, "label_propagation"),
            DetectionMethod::ConnectedComponents => write!(f, "connected_components"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityResult {
    pub communities: Vec<Community>,
    /// Handle → community id, covering every graph node exactly once.
    pub assignments: BTreeMap<String, usize>,
    pub bridges: Vec<BridgeAccount>,
    pub method: DetectionMethod,
    pub modularity: f64,
}

impl std::fmt::Display for CommunityResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Communities: {} (method={}, modularity={:.3}), bridges={} ({} global)",
            self.communities.len(),
            self.method,
            self.modularity,
            self.bridges.len(),
            self.bridges.iter().filter(|b| b.is_global_bridge).count()
        )
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

pub struct CommunityDetector {
    resolution: f64,
    label_prop_seed: u64,
    representatives: usize,
}

impl CommunityDetector {
    pub fn new(config: &Config) -> Self {
        Self {
            resolution: config.resolution,
            label_prop_seed: config.label_prop_seed,
            representatives: config.representatives_per_community,
        }
    }

    /// Partition the graph and characterize the result.
    pub fn detect(
        &self,
        graph: &AccountGraph,
        metrics: &GraphMetrics,
        domain: &DomainProfile,
    ) -> CommunityResult {
        let n = graph.graph.node_count();
        let edges = undirected_projection(graph);

        let mut method = DetectionMethod::WeightedModularity;
        let mut partition = louvain::louvain(n, &edges, self.resolution);
        let mut q = louvain::modularity(n, &edges, &partition, self.resolution);

        if is_degenerate(n, &edges, &partition, q) {
            warn!("Modularity optimization degenerated, falling back to label propagation");
            method = DetectionMethod::LabelPropagation;
            partition = label_prop::label_propagation(n, &edges, self.label_prop_seed);
            q = louvain::modularity(n, &edges, &partition, self.resolution);
        }
        if is_degenerate(n, &edges, &partition, q) {
            warn!("Label propagation degenerated, falling back to connected components");
            method = DetectionMethod::ConnectedComponents;
            partition = components::connected_components(n, &edges);
            q = louvain::modularity(n, &edges, &partition, self.resolution);
        }

        if q.abs() < 0.05 {
            warn!(
                modularity = q,
                "Near-zero modularity: the graph lacks real community structure"
            );
        }

        let communities = characterize(graph, metrics, &partition, domain, self.representatives);
        let bridges = detect_bridges(graph, &partition, communities.len());

        let mut assignments = BTreeMap::new();
        for idx in graph.graph.node_indices() {
            assignments.insert(graph.graph[idx].handle.clone(), partition[idx.index()]);
        }

        let result = CommunityResult {
            communities,
            assignments,
            bridges,
            method,
            modularity: q,
        };
        info!("{result}");
        result
    }
}

/// Undirected projection: directed weights summed per unordered pair.
fn undirected_projection(graph: &AccountGraph) -> Vec<(usize, usize, f64)> {
    let mut weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for edge in graph.graph.edge_references() {
        let (a, b) = (edge.source().index(), edge.target().index());
        if a == b {
            continue;
        }
        let key = (a.min(b), a.max(b));
        *weights.entry(key).or_insert(0.0) += *edge.weight();
    }
    weights.into_iter().map(|((a, b), w)| (a, b, w)).collect()
}

/// A partition is degenerate when the graph has edges but every node sits
/// alone in its own community, or the modularity is not a number.
fn is_degenerate(n: usize, edges: &[(usize, usize, f64)], partition: &[usize], q: f64) -> bool {
    if !q.is_finite() {
        return true;
    }
    if edges.is_empty() || n < 2 {
        return false;
    }
    let communities = partition.iter().copied().max().map_or(0, |c| c + 1);
    communities == n
}
