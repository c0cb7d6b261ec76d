pub mod classifier;
pub mod extractor;
pub mod filters;
pub mod rate_limit;
pub mod snapshot;
pub mod traits;

pub use classifier::{classify, classify_seeds, TierAssignment};
pub use extractor::{ExtractionOutput, ExtractionStats, FollowingExtractor};
pub use filters::{FilterReason, QualityFilter};
pub use rate_limit::RateWindow;
pub use snapshot::{RelationshipSnapshot, SnapshotProvider};
pub use traits::{FollowingPage, FollowingProvider, ProviderError};
