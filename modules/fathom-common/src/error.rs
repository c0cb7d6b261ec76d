use thiserror::Error;

#[derive(Error, Debug)]
pub enum FathomError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider capability requires elevated access: {0}")]
    PermissionDenied(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No usable relationships, cannot build graph")]
    EmptyGraph,

    #[error("All strategy inputs are empty, nothing to rank")]
    EmptyScoringInput,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
