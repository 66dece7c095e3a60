//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid stored data: {0}")]
    InvalidData(String),

    #[error("item not found: {0}")]
    ItemNotFound(i64),

    #[error(transparent)]
    Core(#[from] bunpo_core::SrsError),
}
