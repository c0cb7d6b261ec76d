//! Greedy weighted-modularity community detection (Louvain-style).
//!
//! Two phases per level: local moving (each node greedily joins the
//! neighboring community with the best modularity gain) and aggregation
//! (communities collapse into meta-nodes, intra-community weight becomes a
//! self-loop). Levels repeat until modularity stops improving.
//!
//! Deterministic by construction: nodes are visited in ascending index
//! order every pass and community ties break toward the lowest id, so
//! repeated runs on identical input produce identical partitions.

use std::collections::HashMap;

/// Max local-moving passes per level.
const MAX_PASSES: usize = 100;

/// Max aggregation levels.
const MAX_LEVELS: usize = 10;

/// Minimum modularity improvement to start another level.
const MIN_GAIN: f64 = 1e-7;

/// Partition `n` nodes connected by undirected weighted `edges`.
/// Returns community ids renumbered to consecutive integers in order of
/// first appearance by node index.
pub fn louvain(n: usize, edges: &[(usize, usize, f64)], resolution: f64) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }

    // node -> community in the current meta-graph, composed across levels
    let mut node_to_comm: Vec<usize> = (0..n).collect();
    let mut cur_n = n;
    let mut cur_edges: Vec<(usize, usize, f64)> = edges.to_vec();
    let mut cur_self_loops: Vec<f64> = vec![0.0; n];
    let mut best_q = modularity_of(cur_n, &cur_edges, &cur_self_loops, &node_identity(cur_n), resolution);

    for _level in 0..MAX_LEVELS {
        let (partition, moved) =
            local_moving(cur_n, &cur_edges, &cur_self_loops, resolution);
        if !moved {
            break;
        }

        let partition = renumber(&partition);
        let q = modularity_of(cur_n, &cur_edges, &cur_self_loops, &partition, resolution);
        if q - best_q < MIN_GAIN {
            break;
        }
        best_q = q;

        // Compose into the original node mapping.
        for comm in node_to_comm.iter_mut() {
            *comm = partition[*comm];
        }

        // Aggregate: communities become nodes, intra weight becomes self-loops.
        let meta_n = partition.iter().copied().max().map_or(0, |m| m + 1);
        let mut meta_self_loops = vec![0.0; meta_n];
        let mut meta_edge_weights: HashMap<(usize, usize), f64> = HashMap::new();
        for (i, &sl) in cur_self_loops.iter().enumerate() {
            meta_self_loops[partition[i]] += sl;
        }
        for &(i, j, w) in &cur_edges {
            let (ci, cj) = (partition[i], partition[j]);
            if ci == cj {
                meta_self_loops[ci] += w;
            } else {
                let key = (ci.min(cj), ci.max(cj));
                *meta_edge_weights.entry(key).or_insert(0.0) += w;
            }
        }

        cur_n = meta_n;
        cur_edges = meta_edge_weights
            .into_iter()
            .map(|((i, j), w)| (i, j, w))
            .collect();
        cur_edges.sort_by(|a, b| (a.0, a.1).partial_cmp(&(b.0, b.1)).unwrap());
        cur_self_loops = meta_self_loops;
    }

    renumber(&node_to_comm)
}

/// Modularity of a partition: Q = Σ_c [Σin_c/(2m) − γ(Σtot_c/(2m))²].
pub fn modularity(
    n: usize,
    edges: &[(usize, usize, f64)],
    partition: &[usize],
    resolution: f64,
) -> f64 {
    modularity_of(n, edges, &vec![0.0; n], partition, resolution)
}

fn modularity_of(
    n: usize,
    edges: &[(usize, usize, f64)],
    self_loops: &[f64],
    partition: &[usize],
    resolution: f64,
) -> f64 {
    let m: f64 =
        edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>();
    if m == 0.0 {
        return 0.0;
    }
    let two_m = 2.0 * m;

    let mut degree = vec![0.0; n];
    for &(i, j, w) in edges {
        degree[i] += w;
        degree[j] += w;
    }
    for (i, &sl) in self_loops.iter().enumerate() {
        degree[i] += 2.0 * sl;
    }

    let communities = partition.iter().copied().max().map_or(0, |c| c + 1);
    let mut sum_in = vec![0.0; communities];
    let mut sum_tot = vec![0.0; communities];
    for &(i, j, w) in edges {
        if partition[i] == partition[j] {
            sum_in[partition[i]] += 2.0 * w;
        }
    }
    for (i, &sl) in self_loops.iter().enumerate() {
        sum_in[partition[i]] += 2.0 * sl;
    }
    for i in 0..n {
        sum_tot[partition[i]] += degree[i];
    }

    (0..communities)
        .map(|c| {
            sum_in[c] / two_m - resolution * (sum_tot[c] / two_m) * (sum_tot[c] / two_m)
        })
        .sum()
}

/// Phase 1: greedy local moves. Returns (partition, any_node_moved).
fn local_moving(
    n: usize,
    edges: &[(usize, usize, f64)],
    self_loops: &[f64],
    resolution: f64,
) -> (Vec<usize>, bool) {
    let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for &(i, j, w) in edges {
        adj[i].push((j, w));
        adj[j].push((i, w));
    }

    let mut degree = vec![0.0; n];
    for &(i, j, w) in edges {
        degree[i] += w;
        degree[j] += w;
    }
    for (i, &sl) in self_loops.iter().enumerate() {
        degree[i] += 2.0 * sl;
    }
    let two_m: f64 = degree.iter().sum();
    if two_m == 0.0 {
        return ((0..n).collect(), false);
    }

    let mut community: Vec<usize> = (0..n).collect();
    let mut sum_tot = degree.clone();
    let mut moved_any = false;

    for _pass in 0..MAX_PASSES {
        let mut moved_this_pass = false;

        for node in 0..n {
            let home = community[node];
            sum_tot[home] -= degree[node];

            // Weight from this node into each neighboring community.
            let mut links: HashMap<usize, f64> = HashMap::new();
            links.insert(home, 0.0);
            for &(neighbor, w) in &adj[node] {
                if neighbor != node {
                    *links.entry(community[neighbor]).or_insert(0.0) += w;
                }
            }

            // Best gain; ties break toward the lowest community id.
            let mut best_comm = home;
            let mut best_gain = f64::NEG_INFINITY;
            let mut candidates: Vec<usize> = links.keys().copied().collect();
            candidates.sort_unstable();
            for comm in candidates {
                let w_ic = links[&comm];
                let gain = w_ic - resolution * sum_tot[comm] * degree[node] / two_m;
                if gain > best_gain {
                    best_gain = gain;
                    best_comm = comm;
                }
            }

            sum_tot[best_comm] += degree[node];
            if best_comm != home {
                community[node] = best_comm;
                moved_this_pass = true;
                moved_any = true;
            }
        }

        if !moved_this_pass {
            break;
        }
    }

    (community, moved_any)
}

/// Renumber community ids to consecutive integers in order of first
/// appearance by node index.
fn renumber(partition: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let mut next = 0;
    partition
        .iter()
        .map(|&c| {
            *mapping.entry(c).or_insert_with(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect()
}

fn node_identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two 3-cliques joined by a single light edge.
    fn two_cliques() -> (usize, Vec<(usize, usize, f64)>) {
        let edges = vec![
            (0, 1, 3.0),
            (0, 2, 3.0),
            (1, 2, 3.0),
            (3, 4, 3.0),
            (3, 5, 3.0),
            (4, 5, 3.0),
            (2, 3, 0.5),
        ];
        (6, edges)
    }

    #[test]
    fn separates_two_cliques() {
        let (n, edges) = two_cliques();
        let partition = louvain(n, &edges, 1.0);
        assert_eq!(partition[0], partition[1]);
        assert_eq!(partition[1], partition[2]);
        assert_eq!(partition[3], partition[4]);
        assert_eq!(partition[4], partition[5]);
        assert_ne!(partition[0], partition[3]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let (n, edges) = two_cliques();
        let first = louvain(n, &edges, 1.0);
        for _ in 0..5 {
            assert_eq!(louvain(n, &edges, 1.0), first);
        }
    }

    #[test]
    fn higher_resolution_never_coarsens() {
        let (n, edges) = two_cliques();
        let coarse = louvain(n, &edges, 0.5);
        let fine = louvain(n, &edges, 2.0);
        let count = |p: &[usize]| p.iter().copied().max().unwrap() + 1;
        assert!(count(&fine) >= count(&coarse));
    }

    #[test]
    fn clique_partition_has_positive_modularity() {
        let (n, edges) = two_cliques();
        let partition = louvain(n, &edges, 1.0);
        assert!(modularity(n, &edges, &partition, 1.0) > 0.3);
    }

    #[test]
    fn isolated_nodes_stay_singletons() {
        let partition = louvain(3, &[], 1.0);
        assert_eq!(partition, vec![0, 1, 2]);
    }
}
