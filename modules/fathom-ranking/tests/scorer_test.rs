//! UnifiedScorer tests: hand-craft strategy inputs → score() → assert on
//! normalization, weighting, bonus, and ordering.

use std::collections::BTreeMap;

use fathom_common::{Config, FathomError};
use fathom_ranking::UnifiedScorer;

fn scores(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(h, s)| (h.to_string(), *s)).collect()
}

fn scorer() -> UnifiedScorer {
    UnifiedScorer::new(&Config::default())
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn min_max_endpoints_are_zero_and_one() {
    let graph = scores(&[("low", 2.0), ("mid", 5.0), ("high", 8.0)]);
    let empty = BTreeMap::new();

    let (ranked, _) = scorer().score([&graph, &empty, &empty]).unwrap();
    let by_handle: BTreeMap<&str, &fathom_ranking::CandidateScore> =
        ranked.iter().map(|c| (c.handle.as_str(), c)).collect();

    assert_eq!(by_handle["low"].normalized[0], Some(0.0));
    assert_eq!(by_handle["mid"].normalized[0], Some(0.5));
    assert_eq!(by_handle["high"].normalized[0], Some(1.0));
}

#[test]
fn single_candidate_strategy_normalizes_to_one() {
    let engagement = scores(&[("only", 0.37)]);
    let empty = BTreeMap::new();

    let (ranked, _) = scorer().score([&empty, &empty, &engagement]).unwrap();
    assert_eq!(ranked[0].normalized[2], Some(1.0));
}

#[test]
fn absent_strategy_yields_none_not_zero() {
    let graph = scores(&[("x", 1.0), ("y", 2.0)]);
    let content = scores(&[("x", 4.0), ("z", 1.0)]);
    let empty = BTreeMap::new();

    let (ranked, _) = scorer().score([&graph, &content, &empty]).unwrap();
    let y = ranked.iter().find(|c| c.handle == "y").unwrap();
    assert!(y.normalized[1].is_none());
    assert!(y.raw[1].is_none());
}

// ---------------------------------------------------------------------------
// Bonus law and scenarios
// ---------------------------------------------------------------------------

#[test]
fn final_score_is_weighted_sum_times_bonus() {
    let graph = scores(&[("a", 1.0), ("b", 3.0)]);
    let content = scores(&[("a", 2.0), ("b", 7.0)]);
    let engagement = scores(&[("b", 5.0)]);

    let (ranked, _) = scorer().score([&graph, &content, &engagement]).unwrap();
    for candidate in &ranked {
        let expected_bonus = match candidate.num_sources {
            1 => 1.0,
            2 => 1.2,
            3 => 1.5,
            n => panic!("unexpected num_sources {n}"),
        };
        assert!(
            (candidate.final_score - candidate.weighted_sum * expected_bonus).abs() < 1e-12,
            "bonus law violated for {}",
            candidate.handle
        );
    }
}

#[test]
fn top_candidate_in_all_strategies_scores_exactly_1_5() {
    // X is the top candidate in every strategy, so it normalizes to 1.0
    // everywhere and the weights sum to 1.
    let graph = scores(&[("x", 9.0), ("other", 1.0)]);
    let content = scores(&[("x", 0.9), ("other", 0.1)]);
    let engagement = scores(&[("x", 100.0), ("other", 10.0)]);

    let (ranked, _) = scorer().score([&graph, &content, &engagement]).unwrap();
    let x = &ranked[0];
    assert_eq!(x.handle, "x");
    assert_eq!(x.num_sources, 3);
    assert!((x.weighted_sum - 1.0).abs() < 1e-12);
    assert!((x.final_score - 1.5).abs() < 1e-12);
}

#[test]
fn engagement_only_candidate_scores_0_33() {
    // Y found only by engagement, which reported nobody else.
    let empty = BTreeMap::new();
    let engagement = scores(&[("y", 42.0)]);

    let (ranked, _) = scorer().score([&empty, &empty, &engagement]).unwrap();
    let y = &ranked[0];
    assert_eq!(y.num_sources, 1);
    assert!((y.weighted_sum - 0.33).abs() < 1e-12);
    assert!((y.final_score - 0.33).abs() < 1e-12);
}

#[test]
fn fixed_weights_are_not_redistributed() {
    // Two-strategy candidate: even both normalized at 1.0, the missing
    // strategy's weight stays missing.
    let graph = scores(&[("d", 1.0)]);
    let content = scores(&[("d", 1.0)]);
    let empty = BTreeMap::new();

    let (ranked, _) = scorer().score([&graph, &content, &empty]).unwrap();
    let d = &ranked[0];
    assert!((d.weighted_sum - 0.67).abs() < 1e-12);
    assert!((d.final_score - 0.67 * 1.2).abs() < 1e-12);
}

#[test]
fn adaptive_weights_renormalize_over_contributors() {
    let config = Config {
        adaptive_weights: true,
        ..Config::default()
    };
    let graph = scores(&[("d", 1.0)]);
    let content = scores(&[("d", 1.0)]);
    let empty = BTreeMap::new();

    let (ranked, _) = UnifiedScorer::new(&config)
        .score([&graph, &content, &empty])
        .unwrap();
    let d = &ranked[0];
    assert!((d.weighted_sum - 1.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Ordering and failure semantics
// ---------------------------------------------------------------------------

#[test]
fn output_sorted_descending_with_lexical_ties() {
    let graph = scores(&[("zeta", 5.0), ("alpha", 5.0), ("weak", 1.0)]);
    let empty = BTreeMap::new();

    let (ranked, _) = scorer().score([&graph, &empty, &empty]).unwrap();
    for pair in ranked.windows(2) {
        assert!(pair[0].final_score >= pair[1].final_score);
    }
    // alpha and zeta tie on score; lexical order breaks it.
    assert_eq!(ranked[0].handle, "alpha");
    assert_eq!(ranked[1].handle, "zeta");
}

#[test]
fn scoring_is_idempotent() {
    let graph = scores(&[("a", 1.0), ("b", 2.0), ("c", 2.0)]);
    let content = scores(&[("b", 3.0), ("d", 1.0)]);
    let engagement = scores(&[("a", 0.5)]);

    let (first, _) = scorer().score([&graph, &content, &engagement]).unwrap();
    let (second, _) = scorer().score([&graph, &content, &engagement]).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn all_empty_inputs_are_fatal() {
    let empty = BTreeMap::new();
    let err = scorer().score([&empty, &empty, &empty]).unwrap_err();
    assert!(matches!(err, FathomError::EmptyScoringInput));
}

#[test]
fn one_available_strategy_is_enough() {
    let content = scores(&[("solo", 3.0)]);
    let empty = BTreeMap::new();

    let (ranked, stats) = scorer().score([&empty, &content, &empty]).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(stats.per_strategy, [0, 1, 0]);
}
