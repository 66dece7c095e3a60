//! SQLite schema definitions.

/// Complete schema for the local grammar database. Applied idempotently on
/// every open.
pub const SCHEMA: &str = r#"
-- Grammar points under study
CREATE TABLE IF NOT EXISTS grammar_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    grammar TEXT NOT NULL,
    reading TEXT NOT NULL DEFAULT '',
    usage TEXT NOT NULL DEFAULT '',
    meanings TEXT NOT NULL,                 -- JSON array of strings
    examples TEXT NOT NULL DEFAULT '[]',    -- JSON array of {japanese, english}
    note TEXT NOT NULL DEFAULT '',
    learned_at TEXT,
    stage TEXT NOT NULL DEFAULT 'Apprentice I',
    lesson_status TEXT NOT NULL DEFAULT 'Not Started',
    due_at TEXT,
    correct_answers INTEGER NOT NULL DEFAULT 0,
    incorrect_answers INTEGER NOT NULL DEFAULT 0,
    last_reviewed TEXT
);

-- Settings
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_items_due ON grammar_items(due_at);
CREATE INDEX IF NOT EXISTS idx_items_stage ON grammar_items(stage);
CREATE INDEX IF NOT EXISTS idx_items_lesson ON grammar_items(lesson_status);
"#;

/// Seed default settings if not present.
pub const INIT_SETTINGS: &str = r#"
INSERT OR IGNORE INTO settings (key, value) VALUES ('daily_lesson_limit', '15');
"#;
