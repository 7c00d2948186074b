use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Record {index} from source '{source_name}' has an empty handle")]
    EmptyHandle { source_name: String, index: usize },

    #[error("Record {index} (handle '{handle}') has an empty source")]
    EmptySource { handle: String, index: usize },

    #[error("Record '{handle}' on '{source_name}' has a non-finite rating")]
    NonFiniteRating { source_name: String, handle: String },

    #[error("Record '{handle}' on '{source_name}' has rank 0; ranks start at 1")]
    InvalidRank { source_name: String, handle: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScoutError>;
