//! Review statistics command.

use chrono::{DateTime, Utc};

use crate::db::{LessonRepository, StatsRepository};

pub fn run<R: StatsRepository + LessonRepository>(
    repo: &R,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    println!("Stage breakdown:");
    for (stage, count) in repo.stage_counts()? {
        println!("  {:<14} {count}", stage.to_string());
    }

    let summary = repo.lesson_summary()?;
    println!(
        "\nLessons: {} not started, {} available, {} in progress",
        summary.not_started, summary.available, summary.in_progress
    );

    let stats = repo.review_stats()?;
    match stats.accuracy {
        Some(accuracy) => println!(
            "Accuracy: {:.1}% ({} correct, {} incorrect)",
            accuracy * 100.0,
            stats.total_correct,
            stats.total_incorrect
        ),
        None => println!("No reviews recorded yet."),
    }

    println!("Due now: {}", repo.due_count(now)?);
    Ok(())
}
