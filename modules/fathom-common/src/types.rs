use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Tiers ---

/// Authority rank assigned to a seed account. Tier 1 is highest.
/// Every edge a seed produces carries the seed's tier weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTier {
    Tier1,
    Tier2,
    Tier3,
}

impl AccountTier {
    /// Edge weight contributed by a seed of this tier.
    pub fn weight(&self) -> f64 {
        match self {
            AccountTier::Tier1 => 3.0,
            AccountTier::Tier2 => 2.0,
            AccountTier::Tier3 => 1.0,
        }
    }

    /// Ordinal rank, 1-3.
    pub fn rank(&self) -> u8 {
        match self {
            AccountTier::Tier1 => 1,
            AccountTier::Tier2 => 2,
            AccountTier::Tier3 => 3,
        }
    }

    /// Index into per-tier arrays ([tier1, tier2, tier3]).
    pub fn index(&self) -> usize {
        self.rank() as usize - 1
    }
}

impl std::fmt::Display for AccountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountTier::Tier1 => write!(f, "tier1"),
            AccountTier::Tier2 => write!(f, "tier2"),
            AccountTier::Tier3 => write!(f, "tier3"),
        }
    }
}

// --- Seeds ---

/// A classified seed account, the root input for all downstream weighting.
/// Immutable once created for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAccount {
    pub handle: String,
    pub display_name: String,
    pub tier: AccountTier,
    /// Free-text explanation of why the tier was assigned.
    pub reasoning: String,
}

// --- Profiles ---

/// Raw profile data for an account, as handed to the classifier and filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub handle: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub lang: Option<String>,
}

impl AccountProfile {
    /// Account age in whole days at `now`. Unknown creation dates count as 0.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        match self.created_at {
            Some(created) => (now - created).num_days(),
            None => 0,
        }
    }
}

// --- Graph nodes ---

/// One node per unique account encountered as a seed or a discovered target.
/// Created on first reference; duplicate discovery across seeds merges into
/// the richer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountNode {
    pub handle: String,
    pub display_name: String,
    pub followers_count: u64,
    pub verified: bool,
    pub account_age_days: i64,
    /// Protected or suspended at discovery time.
    pub restricted: bool,
    pub is_seed: bool,
    pub seed_tier: Option<AccountTier>,
}

impl AccountNode {
    /// Minimal stub for an account referenced by an edge but never profiled.
    pub fn stub(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
            display_name: String::new(),
            followers_count: 0,
            verified: false,
            account_age_days: 0,
            restricted: false,
            is_seed: false,
            seed_tier: None,
        }
    }

    pub fn from_profile(profile: &AccountProfile, now: DateTime<Utc>) -> Self {
        Self {
            handle: profile.handle.clone(),
            display_name: profile.display_name.clone(),
            followers_count: profile.followers_count,
            verified: profile.verified,
            account_age_days: profile.age_days(now),
            restricted: profile.protected || profile.suspended,
            is_seed: false,
            seed_tier: None,
        }
    }

    /// Merge a second sighting of the same account, keeping the richer profile.
    pub fn merge(&mut self, other: &AccountNode) {
        if self.display_name.is_empty() {
            self.display_name = other.display_name.clone();
        }
        self.followers_count = self.followers_count.max(other.followers_count);
        self.verified = self.verified || other.verified;
        self.account_age_days = self.account_age_days.max(other.account_age_days);
        self.restricted = self.restricted || other.restricted;
        if other.is_seed {
            self.is_seed = true;
            self.seed_tier = other.seed_tier;
        }
    }
}

// --- Relationships ---

/// A directed following edge tagged with the source seed's tier weight.
/// Invariant: `weight == source_tier.weight()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowingRelationship {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub source_tier: AccountTier,
    pub discovered_at: DateTime<Utc>,
}

impl FollowingRelationship {
    pub fn new(source: &str, target: &str, tier: AccountTier, discovered_at: DateTime<Utc>) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            weight: tier.weight(),
            source_tier: tier,
            discovered_at,
        }
    }
}
