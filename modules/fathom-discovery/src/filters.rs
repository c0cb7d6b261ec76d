//! Per-target quality filters applied during following extraction.
//!
//! An account is excluded if any filter trips. Each exclusion is counted by
//! reason so the run summary can show where coverage went.

use chrono::{DateTime, Utc};
use regex::Regex;

use fathom_common::{AccountProfile, Config};

/// Why a discovered account was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterReason {
    LowFollowers,
    SpamBio,
    TooNew,
    Restricted,
    Language,
}

impl FilterReason {
    pub const ALL: [FilterReason; 5] = [
        FilterReason::LowFollowers,
        FilterReason::SpamBio,
        FilterReason::TooNew,
        FilterReason::Restricted,
        FilterReason::Language,
    ];

    pub fn index(&self) -> usize {
        match self {
            FilterReason::LowFollowers => 0,
            FilterReason::SpamBio => 1,
            FilterReason::TooNew => 2,
            FilterReason::Restricted => 3,
            FilterReason::Language => 4,
        }
    }
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterReason::LowFollowers => write!(f, "low_followers"),
            FilterReason::SpamBio => write!(f, "spam_bio"),
            FilterReason::TooNew => write!(f, "too_new"),
            FilterReason::Restricted => write!(f, "restricted"),
            FilterReason::Language => write!(f, "language"),
        }
    }
}

/// Promotional/crypto/follow-for-follow bio patterns.
const SPAM_PATTERNS: &[&str] = &[
    r"(?i)follow\s*(for|4)\s*follow",
    r"(?i)\bf4f\b",
    r"(?i)\bifb\b",
    r"(?i)\b(crypto|nft|airdrop|presale|memecoin|shitcoin)\b",
    r"(?i)dm\s+for\s+promo",
    r"(?i)(buy|cheap)\s+followers",
    r"(?i)get\s+rich\s+quick",
];

pub struct QualityFilter {
    min_followers: u64,
    min_age_days: i64,
    allowed_langs: Vec<String>,
    spam_patterns: Vec<Regex>,
}

impl QualityFilter {
    pub fn new(config: &Config) -> Self {
        Self {
            min_followers: config.min_followers,
            min_age_days: config.min_account_age_days,
            allowed_langs: config.allowed_langs.clone(),
            spam_patterns: SPAM_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("invalid spam pattern"))
                .collect(),
        }
    }

    /// Returns the first filter the profile trips, or None if it passes.
    pub fn check(&self, profile: &AccountProfile, now: DateTime<Utc>) -> Option<FilterReason> {
        if profile.followers_count < self.min_followers {
            return Some(FilterReason::LowFollowers);
        }
        if self.spam_patterns.iter().any(|p| p.is_match(&profile.bio)) {
            return Some(FilterReason::SpamBio);
        }
        // Unknown creation dates pass; a missing field is not evidence of a
        // throwaway account.
        if profile.created_at.is_some() && profile.age_days(now) < self.min_age_days {
            return Some(FilterReason::TooNew);
        }
        if profile.protected || profile.suspended {
            return Some(FilterReason::Restricted);
        }
        // Same stance for unknown language.
        if let Some(lang) = &profile.lang {
            if !self.allowed_langs.iter().any(|l| l == lang) {
                return Some(FilterReason::Language);
            }
        }
        None
    }
}
