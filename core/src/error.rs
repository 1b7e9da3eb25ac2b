use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
