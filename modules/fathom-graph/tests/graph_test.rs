//! Graph construction tests: relationships in, structure and metrics out.

use chrono::Utc;

use fathom_common::{AccountNode, AccountTier, FathomError, FollowingRelationship};
use fathom_graph::AccountGraph;

fn rel(source: &str, target: &str, tier: AccountTier) -> FollowingRelationship {
    FollowingRelationship::new(source, target, tier, Utc::now())
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn empty_relationship_set_is_fatal() {
    let err = AccountGraph::build(&[], &[]).unwrap_err();
    assert!(matches!(err, FathomError::EmptyGraph));
}

#[test]
fn unprofiled_accounts_get_stub_nodes() {
    let rels = vec![rel("seed", "mystery", AccountTier::Tier1)];
    let graph = AccountGraph::build(&rels, &[]).unwrap();

    assert_eq!(graph.graph.node_count(), 2);
    let idx = graph.index_of["mystery"];
    assert_eq!(graph.graph[idx].handle, "mystery");
    assert_eq!(graph.graph[idx].followers_count, 0);
}

#[test]
fn duplicate_directed_pair_sums_weights() {
    // Same pair observed in two merged snapshots.
    let rels = vec![
        rel("seed", "target", AccountTier::Tier2),
        rel("seed", "target", AccountTier::Tier2),
    ];
    let graph = AccountGraph::build(&rels, &[]).unwrap();

    assert_eq!(graph.graph.edge_count(), 1);
    let metrics = graph.metrics(&rels);
    assert_eq!(metrics.nodes["target"].weighted_in_degree, 4.0);
    assert_eq!(metrics.nodes["target"].in_degree, 1);
}

#[test]
fn profiles_enrich_nodes() {
    let rels = vec![rel("seed", "known", AccountTier::Tier1)];
    let mut profile = AccountNode::stub("known");
    profile.display_name = "Known Account".to_string();
    profile.followers_count = 12_000;
    profile.verified = true;

    let graph = AccountGraph::build(&rels, &[profile]).unwrap();
    let node = &graph.graph[graph.index_of["known"]];
    assert_eq!(node.followers_count, 12_000);
    assert!(node.verified);
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[test]
fn weighted_in_degree_sums_tier_weights() {
    // One target followed by a seed of each tier.
    let rels = vec![
        rel("t1seed", "x", AccountTier::Tier1),
        rel("t2seed", "x", AccountTier::Tier2),
        rel("t3seed", "x", AccountTier::Tier3),
    ];
    let graph = AccountGraph::build(&rels, &[]).unwrap();
    let metrics = graph.metrics(&rels);

    let x = &metrics.nodes["x"];
    assert_eq!(x.weighted_in_degree, 6.0);
    assert_eq!(x.in_degree, 3);
    assert_eq!(x.out_degree, 0);
}

#[test]
fn tier_mix_is_edge_fraction_by_source_tier() {
    let rels = vec![
        rel("t1seed", "x", AccountTier::Tier1),
        rel("t2seed", "x", AccountTier::Tier2),
        rel("other_t1", "x", AccountTier::Tier1),
        rel("t3seed", "y", AccountTier::Tier3),
    ];
    let graph = AccountGraph::build(&rels, &[]).unwrap();
    let metrics = graph.metrics(&rels);

    let mix = metrics.nodes["x"].tier_mix;
    assert!((mix[0] - 2.0 / 3.0).abs() < 1e-12);
    assert!((mix[1] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(mix[2], 0.0);
    assert_eq!(metrics.nodes["y"].tier_mix, [0.0, 0.0, 1.0]);
}

#[test]
fn pagerank_is_a_probability_distribution() {
    let rels = vec![
        rel("a", "b", AccountTier::Tier1),
        rel("b", "c", AccountTier::Tier2),
        rel("c", "a", AccountTier::Tier3),
    ];
    let graph = AccountGraph::build(&rels, &[]).unwrap();
    let metrics = graph.metrics(&rels);

    assert!(metrics.pagerank_converged);
    let total: f64 = metrics.nodes.values().map(|m| m.pagerank).sum();
    assert!((total - 1.0).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_is_stable_node_link_form() {
    let rels = vec![
        rel("b", "a", AccountTier::Tier1),
        rel("a", "c", AccountTier::Tier2),
    ];
    let graph = AccountGraph::build(&rels, &[]).unwrap();
    let export = graph.export();

    let handles: Vec<&str> = export.nodes.iter().map(|n| n.handle.as_str()).collect();
    assert_eq!(handles, vec!["a", "b", "c"]);
    assert_eq!(export.links.len(), 2);
    assert_eq!(export.links[0].source, "a");
}
