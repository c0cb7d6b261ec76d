//! Per-community characterization: size bucket, member quality signals,
//! tier distribution, edge locality, topic labels, representatives.

use std::collections::HashMap;

use petgraph::visit::EdgeRef;

use fathom_common::text::contains_term;
use fathom_common::DomainProfile;

use crate::build::{AccountGraph, GraphMetrics};

use super::{Community, SizeBucket};

pub fn characterize(
    graph: &AccountGraph,
    metrics: &GraphMetrics,
    partition: &[usize],
    domain: &DomainProfile,
    representatives: usize,
) -> Vec<Community> {
    let community_count = partition.iter().copied().max().map_or(0, |c| c + 1);
    let mut members: Vec<Vec<petgraph::graph::NodeIndex>> = vec![Vec::new(); community_count];
    for idx in graph.graph.node_indices() {
        members[partition[idx.index()]].push(idx);
    }

    // Edge locality per community, counted over aggregated directed edges.
    let mut internal = vec![0u32; community_count];
    let mut external = vec![0u32; community_count];
    for edge in graph.graph.edge_references() {
        let ci = partition[edge.source().index()];
        let cj = partition[edge.target().index()];
        if ci == cj {
            internal[ci] += 1;
        } else {
            external[ci] += 1;
            external[cj] += 1;
        }
    }

    let mut communities = Vec::with_capacity(community_count);
    for (id, member_indices) in members.iter().enumerate() {
        let size = member_indices.len();

        let mut verified = 0u32;
        let mut followers_total = 0u64;
        let mut seed_count = 0u32;
        let mut tier_counts = [0u32; 3];
        for &idx in member_indices {
            let node = &graph.graph[idx];
            if node.verified {
                verified += 1;
            }
            followers_total += node.followers_count;
            if node.is_seed {
                seed_count += 1;
            }
            if let Some(tier) = node.seed_tier {
                tier_counts[tier.index()] += 1;
            }
        }

        let mut handles: Vec<String> = member_indices
            .iter()
            .map(|&idx| graph.graph[idx].handle.clone())
            .collect();
        handles.sort();

        // Representatives: top-K by weighted in-degree, ties by handle.
        let mut ranked: Vec<(&String, f64)> = handles
            .iter()
            .map(|h| {
                let w = metrics
                    .nodes
                    .get(h)
                    .map(|m| m.weighted_in_degree)
                    .unwrap_or(0.0);
                (h, w)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(b.0)));
        let reps: Vec<String> = ranked
            .iter()
            .take(representatives)
            .map(|(h, _)| (*h).clone())
            .collect();

        communities.push(Community {
            id,
            size,
            size_bucket: SizeBucket::for_size(size),
            verification_rate: if size > 0 {
                verified as f64 / size as f64
            } else {
                0.0
            },
            avg_followers: if size > 0 {
                followers_total as f64 / size as f64
            } else {
                0.0
            },
            seed_count,
            tier_counts,
            internal_edges: internal[id],
            external_edges: external[id],
            topics: infer_topics(graph, member_indices, domain),
            representatives: reps,
            members: handles,
        });
    }

    communities
}

/// A topic label applies when enough members' handle/display text hits its
/// keyword set: at least one member in small communities, a quarter of the
/// membership in larger ones.
fn infer_topics(
    graph: &AccountGraph,
    members: &[petgraph::graph::NodeIndex],
    domain: &DomainProfile,
) -> Vec<String> {
    let texts: Vec<String> = members
        .iter()
        .map(|&idx| {
            let node = &graph.graph[idx];
            format!("{} {}", node.handle, node.display_name).to_lowercase()
        })
        .collect();

    let threshold = (members.len() / 4).max(1);
    let mut hits_per_topic: HashMap<&str, usize> = HashMap::new();
    for topic in &domain.topics {
        let hits = texts
            .iter()
            .filter(|text| topic.keywords.iter().any(|k| contains_term(text, k)))
            .count();
        hits_per_topic.insert(topic.label, hits);
    }

    domain
        .topics
        .iter()
        .filter(|t| hits_per_topic[t.label] >= threshold)
        .map(|t| t.label.to_string())
        .collect()
}
