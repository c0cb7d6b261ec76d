// Trait abstraction for the relationship-list provider.
//
// The real social-media API client (auth, HTTP, pagination mechanics) lives
// outside this system. The extractor only sees FollowingProvider: paged
// lists of target profiles for an account, with rate-limit and permission
// conditions surfaced as typed errors.

use async_trait::async_trait;
use thiserror::Error;

use fathom_common::AccountProfile;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Rate window exhausted on the provider side. Expected; handled by
    /// waiting, never treated as a failure.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The capability requires elevated API access this run does not have.
    /// Permanent for the run: reported once, never retried.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Transient errors are retried with backoff; the rest are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_) | ProviderError::RateLimited { .. }
        )
    }
}

/// One page of an account's following list.
#[derive(Debug, Clone)]
pub struct FollowingPage {
    pub entries: Vec<AccountProfile>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait FollowingProvider: Send + Sync {
    /// Fetch one page of the accounts `handle` follows, with target profiles.
    async fn following_page(&self, handle: &str, cursor: Option<&str>) -> Result<FollowingPage>;
}
