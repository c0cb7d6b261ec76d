//! Following-relationship extraction for tiered seed accounts.
//!
//! Fetches each seed's following list through the provider abstraction,
//! applies the quality filters, and tags every surviving edge with the
//! seed's tier weight so downstream stages never re-resolve tiers.
//!
//! Seeds are fetched concurrently, bounded by the shared rate window. A
//! global API-call budget caps the whole run: once spent, no new requests
//! are issued and everything already collected flows downstream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use rand::Rng;
use tracing::{info, warn};

use fathom_common::{AccountNode, Config, FollowingRelationship, SeedAccount};

use crate::filters::{FilterReason, QualityFilter};
use crate::rate_limit::RateWindow;
use crate::traits::{FollowingProvider, ProviderError};

/// Max attempts for one page request before it is skipped.
const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Base backoff for transient errors. Actual delay is base * 2^attempt + jitter.
const RETRY_BASE: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters from an extraction run, reported alongside the output snapshot.
#[derive(Debug, Default)]
pub struct ExtractionStats {
    pub seeds_attempted: u32,
    pub seeds_completed: u32,
    pub seeds_not_found: u32,
    pub requests_issued: u32,
    pub pages_fetched: u32,
    pub pages_skipped: u32,
    pub retries: u32,
    pub raw_records: u32,
    pub malformed_records: u32,
    pub duplicates_skipped: u32,
    /// Indexed by FilterReason.
    pub filtered: [u32; 5],
    pub relationships_kept: u32,
    pub budget_exhausted: bool,
    pub permission_denied: bool,
}

impl ExtractionStats {
    fn absorb(&mut self, other: ExtractionStats) {
        self.seeds_attempted += other.seeds_attempted;
        self.seeds_completed += other.seeds_completed;
        self.seeds_not_found += other.seeds_not_found;
        self.requests_issued += other.requests_issued;
        self.pages_fetched += other.pages_fetched;
        self.pages_skipped += other.pages_skipped;
        self.retries += other.retries;
        self.raw_records += other.raw_records;
        self.malformed_records += other.malformed_records;
        self.duplicates_skipped += other.duplicates_skipped;
        for i in 0..self.filtered.len() {
            self.filtered[i] += other.filtered[i];
        }
        self.relationships_kept += other.relationships_kept;
        self.budget_exhausted |= other.budget_exhausted;
        self.permission_denied |= other.permission_denied;
    }

    pub fn total_filtered(&self) -> u32 {
        self.filtered.iter().sum()
    }
}

impl std::fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Extraction Complete ===")?;
        writeln!(f, "Seeds attempted:     {}", self.seeds_attempted)?;
        writeln!(f, "Seeds completed:     {}", self.seeds_completed)?;
        writeln!(f, "Seeds not found:     {}", self.seeds_not_found)?;
        writeln!(f, "Requests issued:     {}", self.requests_issued)?;
        writeln!(f, "Pages fetched:       {}", self.pages_fetched)?;
        writeln!(f, "Pages skipped:       {}", self.pages_skipped)?;
        writeln!(f, "Retries:             {}", self.retries)?;
        writeln!(f, "Raw records:         {}", self.raw_records)?;
        writeln!(f, "Malformed records:   {}", self.malformed_records)?;
        writeln!(f, "Duplicates skipped:  {}", self.duplicates_skipped)?;
        writeln!(f, "Relationships kept:  {}", self.relationships_kept)?;
        writeln!(f, "\nFiltered by reason:")?;
        for reason in FilterReason::ALL {
            writeln!(f, "  {}: {}", reason, self.filtered[reason.index()])?;
        }
        if self.budget_exhausted {
            writeln!(f, "\nAPI budget exhausted, partial coverage")?;
        }
        if self.permission_denied {
            writeln!(f, "Following capability denied, degraded coverage")?;
        }
        Ok(())
    }
}

/// Full extraction result: the relationship snapshot plus the profiles of
/// every account that survived filtering, for graph enrichment.
#[derive(Debug)]
pub struct ExtractionOutput {
    pub relationships: Vec<FollowingRelationship>,
    pub profiles: Vec<AccountNode>,
    pub stats: ExtractionStats,
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

pub struct FollowingExtractor {
    provider: Arc<dyn FollowingProvider>,
    filter: QualityFilter,
    rate_window: Arc<RateWindow>,
    budget: AtomicU32,
    permission_denied: AtomicBool,
    max_pages_per_seed: u32,
    concurrency: usize,
}

struct SeedOutcome {
    relationships: Vec<FollowingRelationship>,
    profiles: Vec<AccountNode>,
    stats: ExtractionStats,
}

impl FollowingExtractor {
    pub fn new(provider: Arc<dyn FollowingProvider>, config: &Config) -> Self {
        Self {
            provider,
            filter: QualityFilter::new(config),
            rate_window: Arc::new(RateWindow::new(
                config.rate_window_requests,
                Duration::from_secs(config.rate_window_secs),
            )),
            budget: AtomicU32::new(config.api_call_budget),
            permission_denied: AtomicBool::new(false),
            max_pages_per_seed: config.max_pages_per_seed,
            concurrency: config.rate_window_requests.clamp(1, 8) as usize,
        }
    }

    /// Extract filtered relationships for every seed.
    pub async fn extract(&self, seeds: &[SeedAccount]) -> ExtractionOutput {
        let now = Utc::now();

        let outcomes: Vec<SeedOutcome> = stream::iter(seeds)
            .map(|seed| self.extract_seed(seed, now))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut stats = ExtractionStats::default();
        let mut relationships = Vec::new();
        let mut profiles: HashMap<String, AccountNode> = HashMap::new();

        // Seeds are nodes too, even when their own fetch produced nothing.
        for seed in seeds {
            let node = profiles
                .entry(seed.handle.clone())
                .or_insert_with(|| AccountNode::stub(&seed.handle));
            node.display_name = seed.display_name.clone();
            node.is_seed = true;
            node.seed_tier = Some(seed.tier);
        }

        for outcome in outcomes {
            stats.absorb(outcome.stats);
            relationships.extend(outcome.relationships);
            for node in outcome.profiles {
                match profiles.get_mut(&node.handle) {
                    Some(existing) => existing.merge(&node),
                    None => {
                        profiles.insert(node.handle.clone(), node);
                    }
                }
            }
        }

        // Stable artifact order regardless of fetch completion order.
        relationships.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        let mut profiles: Vec<AccountNode> = profiles.into_values().collect();
        profiles.sort_by(|a, b| a.handle.cmp(&b.handle));

        info!(
            seeds = seeds.len(),
            relationships = relationships.len(),
            filtered = stats.total_filtered(),
            "Extraction finished"
        );

        ExtractionOutput {
            relationships,
            profiles,
            stats,
        }
    }

    async fn extract_seed(&self, seed: &SeedAccount, now: DateTime<Utc>) -> SeedOutcome {
        let mut stats = ExtractionStats {
            seeds_attempted: 1,
            ..Default::default()
        };
        let mut relationships = Vec::new();
        let mut profiles = Vec::new();
        let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
        let mut cursor: Option<String> = None;

        for _page_no in 0..self.max_pages_per_seed {
            if self.permission_denied.load(Ordering::SeqCst) {
                stats.permission_denied = true;
                break;
            }

            let page = match self.fetch_page(seed, cursor.as_deref(), &mut stats).await {
                PageResult::Page(page) => page,
                PageResult::Stop => break,
            };

            stats.pages_fetched += 1;
            for profile in page.entries {
                stats.raw_records += 1;
                if profile.handle.is_empty() {
                    stats.malformed_records += 1;
                    continue;
                }
                if profile.handle == seed.handle {
                    continue;
                }
                if !seen.insert(profile.handle.clone()) {
                    stats.duplicates_skipped += 1;
                    continue;
                }
                match self.filter.check(&profile, now) {
                    Some(reason) => stats.filtered[reason.index()] += 1,
                    None => {
                        relationships.push(FollowingRelationship::new(
                            &seed.handle,
                            &profile.handle,
                            seed.tier,
                            now,
                        ));
                        profiles.push(AccountNode::from_profile(&profile, now));
                        stats.relationships_kept += 1;
                    }
                }
            }

            cursor = page.next_cursor;
            if cursor.is_none() {
                stats.seeds_completed += 1;
                break;
            }
        }

        SeedOutcome {
            relationships,
            profiles,
            stats,
        }
    }

    async fn fetch_page(
        &self,
        seed: &SeedAccount,
        cursor: Option<&str>,
        stats: &mut ExtractionStats,
    ) -> PageResult {
        let mut attempt = 0u32;
        loop {
            if !self.try_spend_budget() {
                if !stats.budget_exhausted {
                    warn!(
                        seed = seed.handle.as_str(),
                        "API call budget exhausted, stopping extraction for this seed"
                    );
                }
                stats.budget_exhausted = true;
                return PageResult::Stop;
            }

            self.rate_window.acquire().await;
            stats.requests_issued += 1;

            match self.provider.following_page(&seed.handle, cursor).await {
                Ok(page) => return PageResult::Page(page),
                Err(e) if e.is_transient() && attempt + 1 < MAX_FETCH_ATTEMPTS => {
                    attempt += 1;
                    stats.retries += 1;
                    let backoff = match &e {
                        ProviderError::RateLimited { retry_after_secs } => {
                            Duration::from_secs(*retry_after_secs)
                        }
                        _ => RETRY_BASE * 2u32.pow(attempt),
                    };
                    let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
                    warn!(
                        seed = seed.handle.as_str(),
                        attempt,
                        backoff_secs = backoff.as_secs(),
                        error = %e,
                        "Transient provider error, retrying after backoff"
                    );
                    tokio::time::sleep(backoff + jitter).await;
                }
                Err(ProviderError::PermissionDenied(msg)) => {
                    // Permanent for this capability. Report once, keep what we have.
                    if !self.permission_denied.swap(true, Ordering::SeqCst) {
                        warn!(
                            error = msg.as_str(),
                            "Following lists require elevated access; continuing with collected data"
                        );
                    }
                    stats.permission_denied = true;
                    return PageResult::Stop;
                }
                Err(ProviderError::NotFound(_)) => {
                    info!(seed = seed.handle.as_str(), "Seed account no longer exists");
                    stats.seeds_not_found += 1;
                    return PageResult::Stop;
                }
                Err(ProviderError::Malformed(msg)) => {
                    warn!(
                        seed = seed.handle.as_str(),
                        error = msg.as_str(),
                        "Malformed page skipped"
                    );
                    stats.pages_skipped += 1;
                    return PageResult::Stop;
                }
                Err(e) => {
                    warn!(
                        seed = seed.handle.as_str(),
                        error = %e,
                        "Page skipped after {MAX_FETCH_ATTEMPTS} attempts"
                    );
                    stats.pages_skipped += 1;
                    return PageResult::Stop;
                }
            }
        }
    }

    fn try_spend_budget(&self) -> bool {
        self.budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }
}

enum PageResult {
    Page(crate::traits::FollowingPage),
    Stop,
}
