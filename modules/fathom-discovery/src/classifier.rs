//! Tier classification of seed accounts from profile text.
//!
//! Priority order: elite institution → Tier 1, major tech company → Tier 2,
//! two or more domain-keyword bio hits → Tier 3. No match means the account
//! is excluded from the seed set, a "no signal" outcome rather than an error.

use tracing::{debug, info};

use fathom_common::text::contains_term;
use fathom_common::{AccountProfile, AccountTier, DomainProfile, SeedAccount};

/// Result of classifying one profile.
#[derive(Debug, Clone)]
pub struct TierAssignment {
    pub tier: AccountTier,
    pub reasoning: String,
}

/// Classify a single profile against the domain's curated lists.
pub fn classify(profile: &AccountProfile, domain: &DomainProfile) -> Option<TierAssignment> {
    let haystack = format!("{} {}", profile.display_name, profile.bio).to_lowercase();

    if let Some(name) = domain
        .institutions
        .iter()
        .find(|term| contains_term(&haystack, term))
    {
        return Some(TierAssignment {
            tier: AccountTier::Tier1,
            reasoning: format!("institution match: {name}"),
        });
    }

    if let Some(name) = domain
        .companies
        .iter()
        .find(|term| contains_term(&haystack, term))
    {
        return Some(TierAssignment {
            tier: AccountTier::Tier2,
            reasoning: format!("company match: {name}"),
        });
    }

    let bio = profile.bio.to_lowercase();
    let hits: Vec<&str> = domain
        .domain_keywords
        .iter()
        .filter(|term| contains_term(&bio, term))
        .copied()
        .collect();
    if hits.len() >= 2 {
        return Some(TierAssignment {
            tier: AccountTier::Tier3,
            reasoning: format!("domain keywords: {}", hits.join(", ")),
        });
    }

    debug!(handle = profile.handle.as_str(), "No tier signal");
    None
}

/// Classify a batch of profiles into the seed set, dropping no-signal accounts.
pub fn classify_seeds(profiles: &[AccountProfile], domain: &DomainProfile) -> Vec<SeedAccount> {
    let mut seeds = Vec::new();
    let mut no_signal = 0u32;

    for profile in profiles {
        match classify(profile, domain) {
            Some(assignment) => {
                seeds.push(SeedAccount {
                    handle: profile.handle.clone(),
                    display_name: profile.display_name.clone(),
                    tier: assignment.tier,
                    reasoning: assignment.reasoning,
                });
            }
            None => no_signal += 1,
        }
    }

    info!(
        classified = seeds.len(),
        no_signal, "Seed classification complete"
    );
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(handle: &str, display_name: &str, bio: &str) -> AccountProfile {
        AccountProfile {
            handle: handle.to_string(),
            display_name: display_name.to_string(),
            bio: bio.to_string(),
            followers_count: 0,
            verified: false,
            created_at: None,
            protected: false,
            suspended: false,
            lang: None,
        }
    }

    #[test]
    fn institution_beats_company_and_keywords() {
        let domain = DomainProfile::ai_research();
        let p = profile(
            "prof",
            "Jane Doe",
            "Professor at Stanford, formerly Google. Machine learning and computer vision.",
        );
        let a = classify(&p, &domain).unwrap();
        assert_eq!(a.tier, AccountTier::Tier1);
        assert!(a.reasoning.contains("stanford"));
    }

    #[test]
    fn company_assigns_tier2() {
        let domain = DomainProfile::ai_research();
        let p = profile("eng", "Sam Lee", "Research engineer at Anthropic");
        let a = classify(&p, &domain).unwrap();
        assert_eq!(a.tier, AccountTier::Tier2);
    }

    #[test]
    fn two_keyword_hits_assign_tier3() {
        let domain = DomainProfile::ai_research();
        let p = profile("indie", "Alex", "Writing about deep learning and reinforcement learning");
        let a = classify(&p, &domain).unwrap();
        assert_eq!(a.tier, AccountTier::Tier3);
    }

    #[test]
    fn single_keyword_is_no_signal() {
        let domain = DomainProfile::ai_research();
        let p = profile("blog", "Blogger", "I sometimes post about machine learning");
        assert!(classify(&p, &domain).is_none());
    }

    #[test]
    fn substring_does_not_match_inside_word() {
        let domain = DomainProfile::ai_research();
        // "mit" appears inside "committee" but is not a word match
        let p = profile("org", "Standards Committee", "We organize committee meetings");
        assert!(classify(&p, &domain).is_none());
    }

    #[test]
    fn no_signal_accounts_dropped_from_seed_set() {
        let domain = DomainProfile::ai_research();
        let profiles = vec![
            profile("a", "MIT CSAIL", "Lab account"),
            profile("b", "Random", "Posting about cats"),
        ];
        let seeds = classify_seeds(&profiles, &domain);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].handle, "a");
    }
}
