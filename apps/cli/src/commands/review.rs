//! Interactive review session.
//!
//! For each due item: show the pattern, read the typed English meaning,
//! grade it against the item's canonical meanings, and persist the new
//! stage and due time.

use std::io::{BufRead, Write};

use bunpo_core::types::GrammarItem;
use bunpo_core::{apply_review, evaluate, Evaluation, Transition};
use chrono::{DateTime, Utc};

use crate::db::ItemRepository;

/// Grade one typed answer: evaluate, advance or reset, persist.
pub fn grade<R: ItemRepository>(
    repo: &R,
    item: &mut GrammarItem,
    typed: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<(Evaluation, Transition)> {
    let evaluation = evaluate(typed, &item.meanings)?;
    let transition = apply_review(item, now, evaluation.passed)?;
    repo.update_item(item)?;
    tracing::debug!(
        id = item.id,
        score = evaluation.score,
        stage = %transition.stage,
        "graded review"
    );
    Ok((evaluation, transition))
}

/// Run a review session over every item due at `now`, reading answers from
/// `input` and writing prompts to `output`.
pub fn run_session<R: ItemRepository>(
    repo: &R,
    now: DateTime<Utc>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> anyhow::Result<()> {
    let due = repo.due_items(now)?;
    if due.is_empty() {
        writeln!(output, "No reviews due.")?;
        return Ok(());
    }
    writeln!(output, "{} review(s) due.", due.len())?;

    let total = due.len();
    let mut correct = 0usize;
    let mut answered = 0usize;

    for mut item in due {
        writeln!(output)?;
        writeln!(output, "{}", item.grammar)?;
        if !item.reading.is_empty() && item.reading != item.grammar {
            writeln!(output, "  ({})", item.reading)?;
        }
        write!(output, "Meaning: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF ends the session early; unanswered items stay due.
            writeln!(output)?;
            break;
        }
        let typed = line.trim_end_matches(['\r', '\n']);

        let (evaluation, transition) = grade(repo, &mut item, typed, now)?;
        answered += 1;
        if evaluation.passed {
            correct += 1;
            writeln!(
                output,
                "✓ Correct ({:.0}% match on \"{}\") — now {}",
                evaluation.score * 100.0,
                evaluation.best_match,
                transition.stage
            )?;
        } else {
            writeln!(
                output,
                "✗ Not quite ({:.0}% match). Meaning: {} — back to {}",
                evaluation.score * 100.0,
                item.meanings.join("; "),
                transition.stage
            )?;
        }
    }

    writeln!(output)?;
    writeln!(output, "Session done: {correct}/{answered} correct, {total} due.")?;
    Ok(())
}

/// Entry point for the `review` subcommand.
pub fn run<R: ItemRepository>(repo: &R) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_session(repo, Utc::now(), &mut stdin.lock(), &mut stdout.lock())
}
