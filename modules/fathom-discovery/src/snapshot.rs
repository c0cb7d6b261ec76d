//! Relationship snapshots: the durable artifact between extraction and
//! graph construction. A snapshot is self-contained: the pipeline can be
//! re-run from it without touching the network.
//!
//! SnapshotProvider replays a previously captured raw following dump
//! through the FollowingProvider trait, simulating pagination, so the
//! whole extraction path is exercisable offline.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fathom_common::{AccountNode, AccountProfile, FathomError, FollowingRelationship};

use crate::traits::{FollowingPage, FollowingProvider, ProviderError};

// ---------------------------------------------------------------------------
// Snapshot artifact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
    pub captured_at: DateTime<Utc>,
    pub relationships: Vec<FollowingRelationship>,
    pub profiles: Vec<AccountNode>,
}

impl RelationshipSnapshot {
    pub fn new(
        relationships: Vec<FollowingRelationship>,
        profiles: Vec<AccountNode>,
    ) -> Self {
        Self {
            captured_at: Utc::now(),
            relationships,
            profiles,
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), FathomError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, FathomError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Merge independently captured snapshots. Relationships are concatenated;
    /// the duplicate-edge policy (sum weights per directed pair) is applied at
    /// graph construction. Profiles merge keeping the richer record.
    pub fn merge(snapshots: Vec<RelationshipSnapshot>) -> Self {
        let mut relationships = Vec::new();
        let mut profiles: HashMap<String, AccountNode> = HashMap::new();
        let mut captured_at = Utc::now();

        for snapshot in snapshots {
            captured_at = captured_at.min(snapshot.captured_at);
            relationships.extend(snapshot.relationships);
            for node in snapshot.profiles {
                match profiles.get_mut(&node.handle) {
                    Some(existing) => existing.merge(&node),
                    None => {
                        profiles.insert(node.handle.clone(), node);
                    }
                }
            }
        }

        let mut profiles: Vec<AccountNode> = profiles.into_values().collect();
        profiles.sort_by(|a, b| a.handle.cmp(&b.handle));
        relationships.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

        Self {
            captured_at,
            relationships,
            profiles,
        }
    }
}

// ---------------------------------------------------------------------------
// Replay provider
// ---------------------------------------------------------------------------

fn default_page_size() -> usize {
    200
}

/// Raw capture file: every seed's full following list with target profiles.
#[derive(Debug, Deserialize)]
pub struct RawCapture {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    pub following: HashMap<String, Vec<AccountProfile>>,
}

/// Replays a raw capture through the provider trait with simulated pagination.
pub struct SnapshotProvider {
    page_size: usize,
    following: HashMap<String, Vec<AccountProfile>>,
}

impl SnapshotProvider {
    pub fn from_path(path: &Path) -> Result<Self, FathomError> {
        let raw = std::fs::read_to_string(path)?;
        let capture: RawCapture = serde_json::from_str(&raw)?;
        Ok(Self {
            page_size: capture.page_size.max(1),
            following: capture.following,
        })
    }

    pub fn new(following: HashMap<String, Vec<AccountProfile>>, page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            following,
        }
    }
}

#[async_trait]
impl FollowingProvider for SnapshotProvider {
    async fn following_page(
        &self,
        handle: &str,
        cursor: Option<&str>,
    ) -> Result<FollowingPage, ProviderError> {
        let list = self
            .following
            .get(handle)
            .ok_or_else(|| ProviderError::NotFound(handle.to_string()))?;

        let offset: usize = match cursor {
            Some(raw) => raw
                .parse()
                .map_err(|_| ProviderError::Malformed(format!("bad cursor: {raw}")))?,
            None => 0,
        };

        let end = (offset + self.page_size).min(list.len());
        let entries = list[offset..end].to_vec();
        let next_cursor = if end < list.len() {
            Some(end.to_string())
        } else {
            None
        };

        Ok(FollowingPage {
            entries,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(handle: &str) -> AccountProfile {
        AccountProfile {
            handle: handle.to_string(),
            display_name: handle.to_uppercase(),
            bio: String::new(),
            followers_count: 1000,
            verified: false,
            created_at: None,
            protected: false,
            suspended: false,
            lang: Some("en".to_string()),
        }
    }

    #[tokio::test]
    async fn paginates_in_cursor_order() {
        let mut following = HashMap::new();
        following.insert(
            "seed".to_string(),
            vec![profile("a"), profile("b"), profile("c")],
        );
        let provider = SnapshotProvider::new(following, 2);

        let first = provider.following_page("seed", None).await.unwrap();
        assert_eq!(first.entries.len(), 2);
        let cursor = first.next_cursor.unwrap();

        let second = provider.following_page("seed", Some(&cursor)).await.unwrap();
        assert_eq!(second.entries.len(), 1);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn unknown_handle_is_not_found() {
        let provider = SnapshotProvider::new(HashMap::new(), 10);
        let err = provider.following_page("ghost", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }
}
