//! Unified cross-strategy scoring.
//!
//! Three independently produced candidate lists (graph structure, content
//! relevance, engagement quality) fuse into one ranked output. Each
//! strategy is min-max normalized over only the candidates it actually
//! reported; a weighted sum with fixed per-strategy weights and a
//! multi-source bonus produces the final score. Fixed weighting is the
//! default policy: a strategy that missed a candidate contributes zero and
//! its weight is not redistributed. The adaptive variant (renormalize over
//! contributing strategies) sits behind a config flag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use fathom_common::{Config, FathomError};

/// The three discovery strategies, in weight-array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Graph,
    Content,
    Engagement,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Graph, Strategy::Content, Strategy::Engagement];

    pub fn index(&self) -> usize {
        match self {
            Strategy::Graph => 0,
            Strategy::Content => 1,
            Strategy::Engagement => 2,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Graph => write!(f, "graph"),
            Strategy::Content => write!(f, "content"),
            Strategy::Engagement => write!(f, "engagement"),
        }
    }
}

/// Multiplicative bonus for candidates validated by multiple strategies.
fn bonus(num_sources: u32) -> f64 {
    match num_sources {
        0 | 1 => 1.0,
        2 => 1.2,
        _ => 1.5,
    }
}

/// Full scoring trace for one candidate. Raw and normalized per-strategy
/// values are kept for auditability; traceability is a requirement, not
/// optional logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    pub handle: String,
    /// Indexed by Strategy; None when that strategy did not report the handle.
    pub raw: [Option<f64>; 3],
    pub normalized: [Option<f64>; 3],
    pub num_sources: u32,
    /// Weighted sum before the multi-source bonus.
    pub weighted_sum: f64,
    pub final_score: f64,
}

#[derive(Debug, Default)]
pub struct ScoringStats {
    pub candidates: u32,
    pub per_strategy: [u32; 3],
    pub multi_source: u32,
}

impl std::fmt::Display for ScoringStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scoring: candidates={} (graph={}, content={}, engagement={}), multi_source={}",
            self.candidates,
            self.per_strategy[0],
            self.per_strategy[1],
            self.per_strategy[2],
            self.multi_source
        )
    }
}

pub struct UnifiedScorer {
    weights: [f64; 3],
    adaptive_weights: bool,
}

impl UnifiedScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            weights: [
                config.graph_weight,
                config.content_weight,
                config.engagement_weight,
            ],
            adaptive_weights: config.adaptive_weights,
        }
    }

    /// Fuse the three strategy inputs into one ranked list.
    /// Fatal only when every input is empty; one or two empty inputs are a
    /// normal degraded run.
    pub fn score(
        &self,
        inputs: [&BTreeMap<String, f64>; 3],
    ) -> Result<(Vec<CandidateScore>, ScoringStats), FathomError> {
        if inputs.iter().all(|m| m.is_empty()) {
            return Err(FathomError::EmptyScoringInput);
        }

        let normalized: [BTreeMap<&String, f64>; 3] = [
            min_max_normalize(inputs[0]),
            min_max_normalize(inputs[1]),
            min_max_normalize(inputs[2]),
        ];

        // Master map: every handle any strategy reported.
        let mut handles: Vec<&String> = inputs.iter().flat_map(|m| m.keys()).collect();
        handles.sort();
        handles.dedup();

        let mut stats = ScoringStats::default();
        let mut candidates = Vec::with_capacity(handles.len());
        for handle in handles {
            let mut raw = [None; 3];
            let mut norm = [None; 3];
            for strategy in Strategy::ALL {
                let i = strategy.index();
                if let Some(&score) = inputs[i].get(handle) {
                    raw[i] = Some(score);
                    norm[i] = Some(normalized[i][handle]);
                    stats.per_strategy[i] += 1;
                }
            }

            let num_sources = norm.iter().flatten().count() as u32;
            let weighted_sum = if self.adaptive_weights {
                let present: f64 = (0..3)
                    .filter(|&i| norm[i].is_some())
                    .map(|i| self.weights[i])
                    .sum();
                (0..3)
                    .filter_map(|i| norm[i].map(|v| v * self.weights[i] / present))
                    .sum()
            } else {
                (0..3)
                    .filter_map(|i| norm[i].map(|v| v * self.weights[i]))
                    .sum()
            };

            if num_sources > 1 {
                stats.multi_source += 1;
            }
            candidates.push(CandidateScore {
                handle: handle.clone(),
                raw,
                normalized: norm,
                num_sources,
                weighted_sum,
                final_score: weighted_sum * bonus(num_sources),
            });
        }

        // Descending by final score, ties by handle for reproducible output.
        candidates.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap()
                .then_with(|| a.handle.cmp(&b.handle))
        });

        stats.candidates = candidates.len() as u32;
        info!("{stats}");
        Ok((candidates, stats))
    }
}

/// Min-max normalize one strategy's scores over the candidates it reported.
/// A strategy with a single candidate (or all-equal scores) normalizes to
/// 1.0, since every such candidate is trivially the strategy's maximum.
fn min_max_normalize(scores: &BTreeMap<String, f64>) -> BTreeMap<&String, f64> {
    let min = scores.values().cloned().fold(f64::INFINITY, f64::min);
    let max = scores.values().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    scores
        .iter()
        .map(|(handle, &score)| {
            let normalized = if range > 0.0 {
                (score - min) / range
            } else {
                1.0
            };
            (handle, normalized)
        })
        .collect()
}
