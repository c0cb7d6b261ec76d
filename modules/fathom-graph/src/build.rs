//! Weighted directed graph construction from the relationship snapshot.
//!
//! Nodes are the union of every account appearing as source or target, with
//! minimal stubs for accounts referenced by an edge but never profiled.
//! A directed pair is stored once: a duplicate observation of the identical
//! (source, target) pair sums the weights. Within one extraction run each
//! seed's list is de-duplicated first, so summing only takes effect when
//! independently captured snapshots are merged.

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fathom_common::{AccountNode, FathomError, FollowingRelationship};

use crate::pagerank::{weighted_pagerank, DAMPING, MAX_ITERATIONS, TOLERANCE};

/// Arena-indexed account graph. Edge weights are summed tier weights.
#[derive(Debug)]
pub struct AccountGraph {
    pub graph: DiGraph<AccountNode, f64>,
    pub index_of: HashMap<String, NodeIndex>,
}

/// Structural metrics for one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub in_degree: u32,
    pub out_degree: u32,
    pub weighted_in_degree: f64,
    pub pagerank: f64,
    /// Fraction of incoming edges whose source is a Tier 1/2/3 seed.
    pub tier_mix: [f64; 3],
}

/// Per-node metrics plus PageRank convergence diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub nodes: BTreeMap<String, NodeMetrics>,
    pub pagerank_converged: bool,
    pub pagerank_iterations: u32,
}

impl AccountGraph {
    /// Build the graph from relationships and known profiles.
    /// An empty relationship set is fatal: nothing downstream can proceed.
    pub fn build(
        relationships: &[FollowingRelationship],
        profiles: &[AccountNode],
    ) -> Result<Self, FathomError> {
        if relationships.is_empty() {
            return Err(FathomError::EmptyGraph);
        }

        let mut graph: DiGraph<AccountNode, f64> = DiGraph::new();
        let mut index_of: HashMap<String, NodeIndex> = HashMap::new();

        for profile in profiles {
            match index_of.get(&profile.handle) {
                Some(&idx) => graph[idx].merge(profile),
                None => {
                    let idx = graph.add_node(profile.clone());
                    index_of.insert(profile.handle.clone(), idx);
                }
            }
        }

        let mut stubs = 0u32;
        let mut edge_of: HashMap<(NodeIndex, NodeIndex), petgraph::graph::EdgeIndex> =
            HashMap::new();
        for rel in relationships {
            let source = Self::intern(&mut graph, &mut index_of, &rel.source, &mut stubs);
            let target = Self::intern(&mut graph, &mut index_of, &rel.target, &mut stubs);
            match edge_of.get(&(source, target)) {
                Some(&edge) => graph[edge] += rel.weight,
                None => {
                    let edge = graph.add_edge(source, target, rel.weight);
                    edge_of.insert((source, target), edge);
                }
            }
        }

        if stubs > 0 {
            info!(stubs, "Created stub nodes for unprofiled accounts");
        }
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Graph constructed"
        );

        Ok(Self { graph, index_of })
    }

    fn intern(
        graph: &mut DiGraph<AccountNode, f64>,
        index_of: &mut HashMap<String, NodeIndex>,
        handle: &str,
        stubs: &mut u32,
    ) -> NodeIndex {
        match index_of.get(handle) {
            Some(&idx) => idx,
            None => {
                *stubs += 1;
                let idx = graph.add_node(AccountNode::stub(handle));
                index_of.insert(handle.to_string(), idx);
                idx
            }
        }
    }

    /// Compute per-node structural metrics and weighted PageRank.
    pub fn metrics(&self, relationships: &[FollowingRelationship]) -> GraphMetrics {
        let pr = weighted_pagerank(&self.graph, DAMPING, TOLERANCE, MAX_ITERATIONS);
        if !pr.converged {
            warn!(
                iterations = pr.iterations,
                "PageRank did not converge within the iteration cap; using last iterate"
            );
        }

        // Incoming edge count by source tier, for the cross-tier validation mix.
        let mut tier_edges: HashMap<&str, [f64; 3]> = HashMap::new();
        for rel in relationships {
            tier_edges.entry(rel.target.as_str()).or_default()[rel.source_tier.index()] += 1.0;
        }

        let mut nodes = BTreeMap::new();
        for (handle, &idx) in &self.index_of {
            let weighted_in: f64 = self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .map(|e| *e.weight())
                .sum();
            let mix = tier_edges.get(handle.as_str()).copied().unwrap_or_default();
            let mix_total: f64 = mix.iter().sum();
            let tier_mix = if mix_total > 0.0 {
                [mix[0] / mix_total, mix[1] / mix_total, mix[2] / mix_total]
            } else {
                [0.0; 3]
            };

            nodes.insert(
                handle.clone(),
                NodeMetrics {
                    in_degree: self
                        .graph
                        .edges_directed(idx, Direction::Incoming)
                        .count() as u32,
                    out_degree: self
                        .graph
                        .edges_directed(idx, Direction::Outgoing)
                        .count() as u32,
                    weighted_in_degree: weighted_in,
                    pagerank: pr.scores[idx.index()],
                    tier_mix,
                },
            );
        }

        GraphMetrics {
            nodes,
            pagerank_converged: pr.converged,
            pagerank_iterations: pr.iterations,
        }
    }

    /// Generic node-link serialization for external graph tooling.
    pub fn export(&self) -> GraphExport {
        let mut nodes: Vec<ExportNode> = self
            .graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                ExportNode {
                    handle: node.handle.clone(),
                    display_name: node.display_name.clone(),
                    followers_count: node.followers_count,
                    verified: node.verified,
                    is_seed: node.is_seed,
                }
            })
            .collect();
        nodes.sort_by(|a, b| a.handle.cmp(&b.handle));

        let mut links: Vec<ExportLink> = self
            .graph
            .edge_references()
            .map(|e| ExportLink {
                source: self.graph[e.source()].handle.clone(),
                target: self.graph[e.target()].handle.clone(),
                weight: *e.weight(),
            })
            .collect();
        links.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

        GraphExport { nodes, links }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportNode {
    pub handle: String,
    pub display_name: String,
    pub followers_count: u64,
    pub verified: bool,
    pub is_seed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportLink {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Node-link document consumable by generic graph tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub links: Vec<ExportLink>,
}
