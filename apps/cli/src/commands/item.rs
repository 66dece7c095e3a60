//! Adding and listing grammar items.

use anyhow::Context;
use bunpo_core::types::{ExampleSentence, GrammarItem};
use chrono::{DateTime, Utc};
use clap::Args;

use crate::db::ItemRepository;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// The grammar pattern, e.g. "～てしまう"
    pub grammar: String,

    /// Accepted meaning; repeat for variants, or pack variants into one
    /// value with ";" or "/"
    #[arg(long = "meaning", required = true)]
    pub meanings: Vec<String>,

    /// Kana reading of the pattern
    #[arg(long, default_value = "")]
    pub reading: String,

    /// Short usage note
    #[arg(long, default_value = "")]
    pub usage: String,

    /// Example sentence as "JAPANESE = ENGLISH"; repeatable
    #[arg(long = "example")]
    pub examples: Vec<String>,

    /// Free-form note
    #[arg(long, default_value = "")]
    pub note: String,
}

/// Insert a new grammar item. It starts at Apprentice I with its lesson not
/// yet started; `bunpo lessons start` makes it reviewable.
pub fn add<R: ItemRepository>(repo: &R, args: AddArgs) -> anyhow::Result<()> {
    let mut item = GrammarItem::new(args.grammar, args.meanings);
    item.reading = args.reading;
    item.usage = args.usage;
    item.note = args.note;
    for raw in &args.examples {
        let (japanese, english) = raw
            .split_once('=')
            .with_context(|| format!("example must look like JAPANESE = ENGLISH: {raw}"))?;
        item.examples.push(ExampleSentence {
            japanese: japanese.trim().to_string(),
            english: english.trim().to_string(),
        });
    }

    let id = repo.insert_item(&item)?;
    println!("Added item {id}: {}", item.grammar);
    Ok(())
}

/// List items currently due for review.
pub fn list_due<R: ItemRepository>(repo: &R, now: DateTime<Utc>) -> anyhow::Result<()> {
    let due = repo.due_items(now)?;
    if due.is_empty() {
        println!("No reviews due.");
        return Ok(());
    }
    for item in due {
        println!(
            "{:>4}  {:<14} {}",
            item.id,
            item.stage.to_string(),
            item.grammar
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteRepository;
    use bunpo_core::types::{LessonStatus, SrsStage};
    use pretty_assertions::assert_eq;

    #[test]
    fn add_stores_a_complete_item() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let args = AddArgs {
            grammar: "～てしまう".to_string(),
            meanings: vec!["to do completely".to_string()],
            reading: "てしまう".to_string(),
            usage: "verb て-form + しまう".to_string(),
            examples: vec!["宿題を忘れてしまった。 = I forgot my homework.".to_string()],
            note: String::new(),
        };
        add(&repo, args).unwrap();

        let items = repo.all_items().unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.stage, SrsStage::ApprenticeI);
        assert_eq!(item.lesson_status, LessonStatus::NotStarted);
        assert_eq!(item.examples.len(), 1);
        assert_eq!(item.examples[0].english, "I forgot my homework.");
    }

    #[test]
    fn malformed_example_is_rejected() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let args = AddArgs {
            grammar: "も".to_string(),
            meanings: vec!["too; also".to_string()],
            reading: String::new(),
            usage: String::new(),
            examples: vec!["no delimiter here".to_string()],
            note: String::new(),
        };
        assert!(add(&repo, args).is_err());
        assert_eq!(repo.all_items().unwrap().len(), 0);
    }
}
