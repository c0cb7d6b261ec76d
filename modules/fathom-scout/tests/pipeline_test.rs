//! End-to-end pipeline test: fixture files in, artifacts out. No network;
//! extraction replays a raw capture through the snapshot provider.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Duration, Utc};

use fathom_common::{AccountProfile, Config, DomainProfile};
use fathom_graph::GraphMetrics;
use fathom_scout::pipeline::{Pipeline, PipelinePaths, RankedAccount};

fn profile(handle: &str, display_name: &str, bio: &str, followers: u64) -> AccountProfile {
    AccountProfile {
        handle: handle.to_string(),
        display_name: display_name.to_string(),
        bio: bio.to_string(),
        followers_count: followers,
        verified: followers > 10_000,
        created_at: Some(Utc::now() - Duration::days(1500)),
        protected: false,
        suspended: false,
        lang: Some("en".to_string()),
    }
}

/// Three tiered seeds all following the same five targets, plus junk that
/// the filters must drop.
fn write_fixtures(dir: &Path) {
    let seeds = vec![
        profile("prof_ada", "Ada L.", "Professor at Stanford. Robotics.", 50_000),
        profile("eng_bo", "Bo K.", "Research engineer at Anthropic", 20_000),
        profile(
            "indie_cy",
            "Cy D.",
            "Writing about deep learning and reinforcement learning",
            5_000,
        ),
    ];
    std::fs::write(
        dir.join("seeds.json"),
        serde_json::to_string_pretty(&seeds).unwrap(),
    )
    .unwrap();

    let targets: Vec<AccountProfile> = (1..=5)
        .map(|i| {
            profile(
                &format!("t{i}"),
                &format!("Target {i}"),
                "ML research lab",
                20_000 + i as u64,
            )
        })
        .collect();

    let mut following: HashMap<String, Vec<AccountProfile>> = HashMap::new();
    for seed in ["prof_ada", "eng_bo", "indie_cy"] {
        let mut list = targets.clone();
        list.push(profile("tiny", "Tiny", "ML person", 3));
        list.push(profile("spammy", "Spam", "crypto airdrop, follow 4 follow", 90_000));
        following.insert(seed.to_string(), list);
    }

    let capture = serde_json::json!({
        "page_size": 200,
        "following": following,
    });
    std::fs::write(
        dir.join("capture.json"),
        serde_json::to_string_pretty(&capture).unwrap(),
    )
    .unwrap();

    std::fs::write(
        dir.join("content.json"),
        r#"{
            "t1": {"overall_score": 0.9},
            "t2": {"overall_score": 0.4},
            "offgraph": {"overall_score": 0.7}
        }"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("engagement.json"),
        r#"{
            "t1": {"overall_score": 120.0},
            "t3": {"overall_score": 40.0}
        }"#,
    )
    .unwrap();
}

fn paths(dir: &Path, out: &str) -> PipelinePaths {
    PipelinePaths {
        seeds: dir.join("seeds.json"),
        capture: Some(dir.join("capture.json")),
        relationships: Vec::new(),
        content_scores: Some(dir.join("content.json")),
        engagement_scores: Some(dir.join("engagement.json")),
        out_dir: dir.join(out),
    }
}

#[tokio::test]
async fn full_run_produces_consistent_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    let pipeline = Pipeline::new(Config::default(), DomainProfile::ai_research());
    let summary = pipeline.run(&paths(dir.path(), "out")).await.unwrap();

    assert_eq!(summary.seeds, 3);
    // 3 seeds x 5 surviving targets.
    assert_eq!(summary.relationships, 15);
    assert_eq!(summary.nodes, 8);

    let out = dir.path().join("out");
    for artifact in [
        "seeds.json",
        "relationships.json",
        "graph_metrics.json",
        "graph_export.json",
        "communities.json",
        "community_assignments.json",
        "bridges.json",
        "ranked.json",
        "run.json",
    ] {
        assert!(out.join(artifact).exists(), "missing artifact {artifact}");
    }

    // Filtered accounts never become graph nodes.
    let metrics: GraphMetrics =
        serde_json::from_str(&std::fs::read_to_string(out.join("graph_metrics.json")).unwrap())
            .unwrap();
    assert!(!metrics.nodes.contains_key("tiny"));
    assert!(!metrics.nodes.contains_key("spammy"));
    for i in 1..=5 {
        assert_eq!(metrics.nodes[&format!("t{i}")].weighted_in_degree, 6.0);
    }

    // Ranked output is sorted descending, includes the off-graph candidate,
    // and carries display names for graph members.
    let ranked: Vec<RankedAccount> =
        serde_json::from_str(&std::fs::read_to_string(out.join("ranked.json")).unwrap()).unwrap();
    for pair in ranked.windows(2) {
        assert!(pair[0].final_score >= pair[1].final_score);
    }
    assert!(ranked.iter().any(|r| r.handle == "offgraph"));
    let t1 = ranked.iter().find(|r| r.handle == "t1").unwrap();
    assert_eq!(t1.num_sources, 3);
    assert_eq!(t1.display_name, "Target 1");
}

#[tokio::test]
async fn rerun_from_snapshot_matches_capture_run() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    let pipeline = Pipeline::new(Config::default(), DomainProfile::ai_research());
    pipeline.run(&paths(dir.path(), "first")).await.unwrap();

    // Second run rebuilds from the written snapshot instead of the capture.
    let mut second = paths(dir.path(), "second");
    second.capture = None;
    second.relationships = vec![dir.path().join("first").join("relationships.json")];
    pipeline.run(&second).await.unwrap();

    let first_ranked = std::fs::read_to_string(dir.path().join("first/ranked.json")).unwrap();
    let second_ranked = std::fs::read_to_string(dir.path().join("second/ranked.json")).unwrap();
    assert_eq!(first_ranked, second_ranked);
}

#[tokio::test]
async fn missing_strategy_documents_still_rank() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    let mut p = paths(dir.path(), "graph_only");
    p.content_scores = None;
    p.engagement_scores = None;

    let pipeline = Pipeline::new(Config::default(), DomainProfile::ai_research());
    let summary = pipeline.run(&p).await.unwrap();

    // Graph strategy alone covers all nodes.
    assert_eq!(summary.candidates, summary.nodes);
}
