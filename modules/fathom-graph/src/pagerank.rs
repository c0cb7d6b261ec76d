//! Weighted PageRank via power iteration.
//!
//! Rank flows along outgoing edges proportionally to edge weight. Dangling
//! mass is redistributed uniformly, so the output stays a probability
//! distribution over nodes. The loop is bounded: if the tolerance is not
//! reached within the cap, the last iterate is returned with
//! `converged = false`; callers decide how loudly to complain.

use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use fathom_common::AccountNode;

pub const DAMPING: f64 = 0.85;
pub const TOLERANCE: f64 = 1e-6;
pub const MAX_ITERATIONS: u32 = 100;

#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// Indexed by node index. Sums to 1 within numerical tolerance.
    pub scores: Vec<f64>,
    pub converged: bool,
    pub iterations: u32,
}

pub fn weighted_pagerank(
    graph: &DiGraph<AccountNode, f64>,
    damping: f64,
    tolerance: f64,
    max_iterations: u32,
) -> PageRankResult {
    let n = graph.node_count();
    if n == 0 {
        return PageRankResult {
            scores: Vec::new(),
            converged: true,
            iterations: 0,
        };
    }

    // Total outgoing weight per node; zero marks a dangling node.
    let out_weight: Vec<f64> = graph
        .node_indices()
        .map(|idx| {
            graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| *e.weight())
                .sum()
        })
        .collect();

    let uniform = 1.0 / n as f64;
    let mut ranks = vec![uniform; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;

        let dangling: f64 = graph
            .node_indices()
            .filter(|idx| out_weight[idx.index()] == 0.0)
            .map(|idx| ranks[idx.index()])
            .sum();

        let mut next = vec![(1.0 - damping) * uniform + damping * dangling * uniform; n];
        for idx in graph.node_indices() {
            let mut incoming = 0.0;
            for edge in graph.edges_directed(idx, Direction::Incoming) {
                let source = edge.source().index();
                incoming += ranks[source] * edge.weight() / out_weight[source];
            }
            next[idx.index()] += damping * incoming;
        }

        let delta: f64 = ranks
            .iter()
            .zip(&next)
            .map(|(old, new)| (old - new).abs())
            .sum();
        ranks = next;

        if delta < tolerance {
            converged = true;
            break;
        }
    }

    PageRankResult {
        scores: ranks,
        converged,
        iterations,
    }
}
