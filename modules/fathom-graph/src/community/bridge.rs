//! Bridge-account detection: nodes whose neighbors span multiple
//! communities, indicating cross-community relevance.

use std::collections::BTreeMap;

use petgraph::Direction;

use crate::build::AccountGraph;

use super::BridgeAccount;

/// Find every node whose neighbor histogram spans at least two communities.
///
/// The histogram counts edges (both directions) into each community the
/// node's neighbors belong to. Global bridge: ≥3 distinct communities;
/// local bridge: exactly 2. The score is the fraction of the partition's
/// communities the node connects to, so it grows monotonically with the
/// distinct count.
pub fn detect_bridges(
    graph: &AccountGraph,
    partition: &[usize],
    community_count: usize,
) -> Vec<BridgeAccount> {
    let mut bridges = Vec::new();

    for idx in graph.graph.node_indices() {
        let mut links: BTreeMap<usize, u32> = BTreeMap::new();
        for direction in [Direction::Outgoing, Direction::Incoming] {
            for neighbor in graph.graph.neighbors_directed(idx, direction) {
                *links.entry(partition[neighbor.index()]).or_insert(0) += 1;
            }
        }

        let distinct = links.len();
        if distinct < 2 {
            continue;
        }

        bridges.push(BridgeAccount {
            handle: graph.graph[idx].handle.clone(),
            bridge_score: distinct as f64 / community_count.max(1) as f64,
            is_global_bridge: distinct >= 3,
            is_local_bridge: distinct == 2,
            community_links: links,
        });
    }

    bridges.sort_by(|a, b| {
        b.bridge_score
            .partial_cmp(&a.bridge_score)
            .unwrap()
            .then_with(|| a.handle.cmp(&b.handle))
    });
    bridges
}
