//! Lesson pipeline commands.

use chrono::{DateTime, Utc};
use clap::Subcommand;

use crate::db::{LessonRepository, SettingsRepository};

#[derive(Debug, Subcommand)]
pub enum LessonAction {
    /// Start lessons for new items, making them due immediately
    Start {
        /// Override the configured daily lesson limit
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run<R: LessonRepository + SettingsRepository>(
    repo: &R,
    action: Option<LessonAction>,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    match action {
        None => {
            let summary = repo.lesson_summary()?;
            println!(
                "Lessons: {} not started, {} available, {} in progress",
                summary.not_started, summary.available, summary.in_progress
            );
        }
        Some(LessonAction::Start { limit }) => {
            let limit = match limit {
                Some(limit) => limit,
                None => repo.daily_lesson_limit()?,
            };
            let started = repo.start_lessons(limit, now)?;
            if started.is_empty() {
                println!("No new items to start.");
            } else {
                println!("Started {} lesson(s):", started.len());
                for item in &started {
                    println!("  {}  {}", item.grammar, item.meanings.join("; "));
                }
            }
        }
    }
    Ok(())
}
