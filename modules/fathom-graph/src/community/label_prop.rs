//! Weighted label propagation, the fast fallback when modularity
//! optimization degenerates.
//!
//! Nodes repeatedly adopt the label with the highest incident edge weight
//! among their neighbors. Visit order is shuffled and ties are broken with
//! a seeded RNG, so a fixed seed gives identical partitions across runs.

use std::collections::HashMap;

use rand::prelude::*;

const MAX_ITER: usize = 100;

pub fn label_propagation(n: usize, edges: &[(usize, usize, f64)], seed: u64) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }

    let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for &(i, j, w) in edges {
        adj[i].push((j, w));
        adj[j].push((i, w));
    }

    let mut labels: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);

    for _iter in 0..MAX_ITER {
        let mut changed = false;

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut rng);

        for &node in &order {
            if adj[node].is_empty() {
                continue;
            }

            let mut label_weight: HashMap<usize, f64> = HashMap::new();
            for &(neighbor, w) in &adj[node] {
                *label_weight.entry(labels[neighbor]).or_insert(0.0) += w;
            }

            let max_weight = label_weight
                .values()
                .fold(f64::NEG_INFINITY, |acc, &w| acc.max(w));
            let mut candidates: Vec<usize> = label_weight
                .iter()
                .filter(|(_, &w)| w == max_weight)
                .map(|(&label, _)| label)
                .collect();
            candidates.sort_unstable();

            let new_label = if candidates.len() == 1 {
                candidates[0]
            } else {
                candidates[rng.random_range(0..candidates.len())]
            };

            if labels[node] != new_label {
                labels[node] = new_label;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    renumber(&labels)
}

fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let mut next = 0;
    labels
        .iter()
        .map(|&l| {
            *mapping.entry(l).or_insert_with(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect()
}
