use thiserror::Error;

/// Infrastructure failures only. User mistakes (bad menu choice, failed
/// verification, unmatched transaction, ambiguous yes/no) are never
/// errors — they come back as plain-language reprompt turns.
#[derive(Error, Debug)]
pub enum SupportError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown conversation stage '{stage}'")]
    UnknownStage { stage: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SupportResult<T> = Result<T, SupportError>;
