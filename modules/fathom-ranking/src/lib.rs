pub mod input;
pub mod scorer;

pub use input::load_strategy_scores;
pub use scorer::{CandidateScore, ScoringStats, Strategy, UnifiedScorer};
