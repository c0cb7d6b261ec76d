//! Strategy-score document loading.
//!
//! Content and engagement strategies arrive as JSON documents mapping
//! handle → record with at least a numeric `overall_score` field. A record
//! missing the score is skipped and logged, never fatal.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use fathom_common::FathomError;

pub fn load_strategy_scores(path: &Path) -> Result<BTreeMap<String, f64>, FathomError> {
    let raw = std::fs::read_to_string(path)?;
    let doc: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)?;

    let mut scores = BTreeMap::new();
    for (handle, record) in doc {
        match record.get("overall_score").and_then(|v| v.as_f64()) {
            Some(score) => {
                scores.insert(handle, score);
            }
            None => {
                warn!(
                    handle = handle.as_str(),
                    "Strategy record has no numeric overall_score, skipping"
                );
            }
        }
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_overall_scores_and_skips_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "good": {{"overall_score": 0.8, "posts": 12}},
                "bad": {{"posts": 3}}
            }}"#
        )
        .unwrap();

        let scores = load_strategy_scores(file.path()).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["good"], 0.8);
    }
}
