//! Repository pattern for grammar item storage.
//!
//! The command layer talks to these traits, never to SQL directly; the core
//! library stays storage-free entirely. All timestamps are stored as RFC 3339
//! text and stage/status strings are validated on the way out, so malformed
//! rows surface as errors instead of silently defaulting.

use bunpo_core::types::{ExampleSentence, GrammarItem, LessonStatus, SrsStage};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::db::error::DbError;

type Result<T> = std::result::Result<T, DbError>;

const ITEM_COLUMNS: &str = "id, grammar, reading, usage, meanings, examples, note, learned_at, \
     stage, lesson_status, due_at, correct_answers, incorrect_answers, last_reviewed";

/// Repository for grammar item operations.
pub trait ItemRepository {
    fn insert_item(&self, item: &GrammarItem) -> Result<i64>;
    fn update_item(&self, item: &GrammarItem) -> Result<()>;
    fn get_item(&self, id: i64) -> Result<Option<GrammarItem>>;
    fn all_items(&self) -> Result<Vec<GrammarItem>>;
    /// Items due at or before `now`, soonest first. Burned items and items
    /// whose lesson has not started are never due.
    fn due_items(&self, now: DateTime<Utc>) -> Result<Vec<GrammarItem>>;
    fn items_by_stage(&self, stage: SrsStage) -> Result<Vec<GrammarItem>>;
    fn items_by_lesson_status(&self, status: LessonStatus) -> Result<Vec<GrammarItem>>;
}

/// Repository for lesson pipeline operations.
pub trait LessonRepository {
    /// Promote up to `limit` not-started items to Available, due immediately.
    /// Returns the promoted items.
    fn start_lessons(&self, limit: usize, now: DateTime<Utc>) -> Result<Vec<GrammarItem>>;
    fn lesson_summary(&self) -> Result<LessonSummary>;
}

/// Repository for settings operations.
pub trait SettingsRepository {
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
    fn daily_lesson_limit(&self) -> Result<usize>;
}

/// Repository for statistics operations.
pub trait StatsRepository {
    /// Item counts per stage, in progression order.
    fn stage_counts(&self) -> Result<Vec<(SrsStage, usize)>>;
    fn review_stats(&self) -> Result<ReviewStats>;
    fn due_count(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Counts of items per lesson status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LessonSummary {
    pub not_started: usize,
    pub available: usize,
    pub in_progress: usize,
}

/// Lifetime review totals.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ReviewStats {
    pub total_correct: u64,
    pub total_incorrect: u64,
    /// `None` before the first graded review.
    pub accuracy: Option<f64>,
}

/// SQLite implementation of the repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating it and its schema if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        tracing::debug!(path = %path.as_ref().display(), "opening grammar database");
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_SETTINGS)?;
        Ok(())
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<GrammarItem> {
        let meanings_json: String = row.get(4)?;
        let meanings: Vec<String> =
            serde_json::from_str(&meanings_json).map_err(|e| conversion_err(4, e))?;

        let examples_json: String = row.get(5)?;
        let examples: Vec<ExampleSentence> =
            serde_json::from_str(&examples_json).map_err(|e| conversion_err(5, e))?;

        let stage: SrsStage = row
            .get::<_, String>(8)?
            .parse()
            .map_err(|e| conversion_err(8, e))?;
        let lesson_status: LessonStatus = row
            .get::<_, String>(9)?
            .parse()
            .map_err(|e| conversion_err(9, e))?;

        Ok(GrammarItem {
            id: row.get(0)?,
            grammar: row.get(1)?,
            reading: row.get(2)?,
            usage: row.get(3)?,
            meanings,
            examples,
            note: row.get(6)?,
            learned_at: parse_datetime(7, row.get(7)?)?,
            stage,
            lesson_status,
            due_at: parse_datetime(10, row.get(10)?)?,
            correct_answers: row.get(11)?,
            incorrect_answers: row.get(12)?,
            last_reviewed: parse_datetime(13, row.get(13)?)?,
        })
    }
}

fn conversion_err(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_datetime(idx: usize, value: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| conversion_err(idx, e))
        })
        .transpose()
}

impl ItemRepository for SqliteRepository {
    fn insert_item(&self, item: &GrammarItem) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO grammar_items
                (grammar, reading, usage, meanings, examples, note, learned_at,
                 stage, lesson_status, due_at, correct_answers, incorrect_answers, last_reviewed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                item.grammar,
                item.reading,
                item.usage,
                serde_json::to_string(&item.meanings)?,
                serde_json::to_string(&item.examples)?,
                item.note,
                item.learned_at.map(|t| t.to_rfc3339()),
                item.stage.as_str(),
                item.lesson_status.as_str(),
                item.due_at.map(|t| t.to_rfc3339()),
                item.correct_answers,
                item.incorrect_answers,
                item.last_reviewed.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_item(&self, item: &GrammarItem) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE grammar_items SET
                grammar = ?1, reading = ?2, usage = ?3, meanings = ?4, examples = ?5,
                note = ?6, learned_at = ?7, stage = ?8, lesson_status = ?9, due_at = ?10,
                correct_answers = ?11, incorrect_answers = ?12, last_reviewed = ?13
             WHERE id = ?14",
            params![
                item.grammar,
                item.reading,
                item.usage,
                serde_json::to_string(&item.meanings)?,
                serde_json::to_string(&item.examples)?,
                item.note,
                item.learned_at.map(|t| t.to_rfc3339()),
                item.stage.as_str(),
                item.lesson_status.as_str(),
                item.due_at.map(|t| t.to_rfc3339()),
                item.correct_answers,
                item.incorrect_answers,
                item.last_reviewed.map(|t| t.to_rfc3339()),
                item.id,
            ],
        )?;
        if changed == 0 {
            return Err(DbError::ItemNotFound(item.id));
        }
        Ok(())
    }

    fn get_item(&self, id: i64) -> Result<Option<GrammarItem>> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM grammar_items WHERE id = ?1"),
                params![id],
                Self::row_to_item,
            )
            .optional()
            .map_err(Into::into)
    }

    fn all_items(&self) -> Result<Vec<GrammarItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ITEM_COLUMNS} FROM grammar_items ORDER BY id"))?;
        let items = stmt
            .query_map([], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn due_items(&self, now: DateTime<Utc>) -> Result<Vec<GrammarItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM grammar_items
             WHERE due_at IS NOT NULL AND due_at <= ?1 AND stage != 'Burned'
             ORDER BY due_at"
        ))?;
        let items = stmt
            .query_map(params![now.to_rfc3339()], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn items_by_stage(&self, stage: SrsStage) -> Result<Vec<GrammarItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM grammar_items WHERE stage = ?1 ORDER BY id"
        ))?;
        let items = stmt
            .query_map(params![stage.as_str()], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn items_by_lesson_status(&self, status: LessonStatus) -> Result<Vec<GrammarItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM grammar_items WHERE lesson_status = ?1 ORDER BY id"
        ))?;
        let items = stmt
            .query_map(params![status.as_str()], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

impl LessonRepository for SqliteRepository {
    fn start_lessons(&self, limit: usize, now: DateTime<Utc>) -> Result<Vec<GrammarItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM grammar_items
             WHERE lesson_status = ?1 ORDER BY id LIMIT ?2"
        ))?;
        let mut items = stmt
            .query_map(
                params![LessonStatus::NotStarted.as_str(), limit],
                Self::row_to_item,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for item in &mut items {
            item.lesson_status = LessonStatus::Available;
            item.due_at = Some(now);
            item.learned_at = Some(now);
            self.conn.execute(
                "UPDATE grammar_items SET lesson_status = ?1, due_at = ?2, learned_at = ?3
                 WHERE id = ?4",
                params![
                    item.lesson_status.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                    item.id
                ],
            )?;
        }

        tracing::info!(count = items.len(), "started lessons");
        Ok(items)
    }

    fn lesson_summary(&self) -> Result<LessonSummary> {
        let mut stmt = self
            .conn
            .prepare("SELECT lesson_status, COUNT(*) FROM grammar_items GROUP BY lesson_status")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut summary = LessonSummary {
            not_started: 0,
            available: 0,
            in_progress: 0,
        };
        for (status, count) in rows {
            match status
                .parse::<LessonStatus>()
                .map_err(|e| DbError::InvalidData(e.to_string()))?
            {
                LessonStatus::NotStarted => summary.not_started = count,
                LessonStatus::Available => summary.available = count,
                LessonStatus::InProgress => summary.in_progress = count,
            }
        }
        Ok(summary)
    }
}

impl SettingsRepository for SqliteRepository {
    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn daily_lesson_limit(&self) -> Result<usize> {
        match self.get_setting("daily_lesson_limit")? {
            Some(value) => value
                .parse()
                .map_err(|_| DbError::InvalidData(format!("daily_lesson_limit: {value}"))),
            None => Ok(15),
        }
    }
}

impl StatsRepository for SqliteRepository {
    fn stage_counts(&self) -> Result<Vec<(SrsStage, usize)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT stage, COUNT(*) FROM grammar_items GROUP BY stage")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut counts = SrsStage::ALL.map(|stage| (stage, 0usize));
        for (stage, count) in rows {
            let stage = stage
                .parse::<SrsStage>()
                .map_err(|e| DbError::InvalidData(e.to_string()))?;
            if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == stage) {
                entry.1 = count;
            }
        }
        Ok(counts.to_vec())
    }

    fn review_stats(&self) -> Result<ReviewStats> {
        let (total_correct, total_incorrect): (u64, u64) = self.conn.query_row(
            "SELECT COALESCE(SUM(correct_answers), 0), COALESCE(SUM(incorrect_answers), 0)
             FROM grammar_items",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let total = total_correct + total_incorrect;
        let accuracy = (total > 0).then(|| total_correct as f64 / total as f64);
        Ok(ReviewStats {
            total_correct,
            total_incorrect,
            accuracy,
        })
    }

    fn due_count(&self, now: DateTime<Utc>) -> Result<usize> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM grammar_items
                 WHERE due_at IS NOT NULL AND due_at <= ?1 AND stage != 'Burned'",
                params![now.to_rfc3339()],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn item(grammar: &str) -> GrammarItem {
        GrammarItem::new(grammar, vec!["meaning".to_string()])
    }

    #[test]
    fn insert_and_fetch_round_trip() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut original = item("～てしまう");
        original.reading = "てしまう".to_string();
        original.meanings = vec!["to do completely".to_string(), "unfortunately".to_string()];
        original.examples = push_example(original.examples);
        original.note = "often contracted to ちゃう".to_string();

        let id = repo.insert_item(&original).unwrap();
        original.id = id;

        let fetched = repo.get_item(id).unwrap().unwrap();
        assert_eq!(fetched, original);
    }

    fn push_example(mut examples: Vec<ExampleSentence>) -> Vec<ExampleSentence> {
        examples.push(ExampleSentence {
            japanese: "宿題を忘れてしまった。".to_string(),
            english: "I (regrettably) forgot my homework.".to_string(),
        });
        examples
    }

    #[test]
    fn missing_item_is_none_and_update_errors() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        assert_eq!(repo.get_item(42).unwrap(), None);

        let mut ghost = item("ghost");
        ghost.id = 42;
        assert!(matches!(
            repo.update_item(&ghost),
            Err(DbError::ItemNotFound(42))
        ));
    }

    #[test]
    fn due_query_excludes_burned_future_and_unstarted() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();

        let mut due = item("due");
        due.lesson_status = LessonStatus::InProgress;
        due.due_at = Some(now - Duration::hours(1));
        repo.insert_item(&due).unwrap();

        let mut future = item("future");
        future.lesson_status = LessonStatus::InProgress;
        future.due_at = Some(now + Duration::hours(1));
        repo.insert_item(&future).unwrap();

        let mut burned = item("burned");
        burned.stage = SrsStage::Burned;
        burned.lesson_status = LessonStatus::InProgress;
        burned.due_at = Some(now - Duration::hours(1));
        repo.insert_item(&burned).unwrap();

        // Not started: no due_at at all.
        repo.insert_item(&item("unstarted")).unwrap();

        let found = repo.due_items(now).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].grammar, "due");
        assert_eq!(repo.due_count(now).unwrap(), 1);
    }

    #[test]
    fn due_items_come_back_soonest_first() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();

        for (grammar, hours_ago) in [("second", 1), ("first", 5), ("third", 0)] {
            let mut it = item(grammar);
            it.lesson_status = LessonStatus::InProgress;
            it.due_at = Some(now - Duration::hours(hours_ago));
            repo.insert_item(&it).unwrap();
        }

        let order: Vec<String> = repo
            .due_items(now)
            .unwrap()
            .into_iter()
            .map(|i| i.grammar)
            .collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn start_lessons_respects_limit_and_sets_due() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let now = Utc::now();
        for i in 0..5 {
            repo.insert_item(&item(&format!("item {i}"))).unwrap();
        }

        let started = repo.start_lessons(3, now).unwrap();
        assert_eq!(started.len(), 3);
        for it in &started {
            assert_eq!(it.lesson_status, LessonStatus::Available);
            assert!(it.due_at.is_some());
        }

        let summary = repo.lesson_summary().unwrap();
        assert_eq!(
            summary,
            LessonSummary {
                not_started: 2,
                available: 3,
                in_progress: 0
            }
        );

        // Newly available items are immediately reviewable.
        assert_eq!(repo.due_items(now).unwrap().len(), 3);
    }

    #[test]
    fn stage_counts_cover_every_stage_in_order() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut guru = item("guru");
        guru.stage = SrsStage::GuruI;
        repo.insert_item(&guru).unwrap();
        repo.insert_item(&item("fresh")).unwrap();

        let counts = repo.stage_counts().unwrap();
        assert_eq!(counts.len(), SrsStage::ALL.len());
        assert_eq!(counts[0], (SrsStage::ApprenticeI, 1));
        assert_eq!(counts[4], (SrsStage::GuruI, 1));
        assert_eq!(counts[8], (SrsStage::Burned, 0));
    }

    #[test]
    fn review_stats_aggregate_counters() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut a = item("a");
        a.correct_answers = 3;
        a.incorrect_answers = 1;
        repo.insert_item(&a).unwrap();
        let mut b = item("b");
        b.correct_answers = 1;
        b.incorrect_answers = 3;
        repo.insert_item(&b).unwrap();

        let stats = repo.review_stats().unwrap();
        assert_eq!(stats.total_correct, 4);
        assert_eq!(stats.total_incorrect, 4);
        assert_eq!(stats.accuracy, Some(0.5));
    }

    #[test]
    fn review_stats_before_any_review() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let stats = repo.review_stats().unwrap();
        assert_eq!(stats.accuracy, None);
    }

    #[test]
    fn settings_default_and_override() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        assert_eq!(repo.daily_lesson_limit().unwrap(), 15);

        repo.set_setting("daily_lesson_limit", "5").unwrap();
        assert_eq!(repo.daily_lesson_limit().unwrap(), 5);
    }
}
