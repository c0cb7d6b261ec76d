pub mod build;
pub mod community;
pub mod pagerank;

pub use build::{AccountGraph, GraphExport, GraphMetrics, NodeMetrics};
pub use community::{
    BridgeAccount, Community, CommunityDetector, CommunityResult, DetectionMethod, SizeBucket,
};
pub use pagerank::{weighted_pagerank, PageRankResult};
