//! Local SQLite storage for grammar items.

pub mod error;
pub mod repository;
pub mod schema;

use std::path::PathBuf;

pub use error::DbError;
pub use repository::{
    ItemRepository, LessonRepository, LessonSummary, ReviewStats, SettingsRepository,
    SqliteRepository, StatsRepository,
};

/// Default database location under the platform data directory.
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| anyhow::anyhow!("no platform data directory"))?;
    Ok(base.join("bunpo").join("grammar.db"))
}

/// Open the repository at `path`, or at the default location.
pub fn open(path: Option<PathBuf>) -> anyhow::Result<SqliteRepository> {
    let path = match path {
        Some(path) => path,
        None => default_db_path()?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteRepository::open(path)?)
}
