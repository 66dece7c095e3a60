//! Typed-answer evaluation against canonical meanings.
//!
//! Canonical meanings often pack several accepted renderings into one string
//! ("too; also", "～ is/am/are ～"), so each meaning is expanded into
//! candidates: the full string plus every delimiter-separated part. The
//! typed answer scores against every candidate and the maximum wins.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SrsError};

/// Minimum similarity for a typed answer to count as correct.
pub const PASS_THRESHOLD: f64 = 0.75;

/// Delimiters separating accepted variants inside one canonical meaning.
const PART_DELIMITERS: [char; 6] = [';', '/', ',', '.', '!', '?'];

/// Verdict for a typed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The candidate (full meaning or part) that scored highest, normalized.
    /// Ties break to the earliest candidate in declaration order.
    pub best_match: String,
    /// Similarity in [0, 1]; 1.0 means identical after normalization.
    pub score: f64,
    pub passed: bool,
}

/// Grade a typed answer against an item's acceptable meanings.
///
/// Pure and deterministic. An empty meanings list is a malformed item and an
/// error; an empty or hopeless typed answer is just a failed review.
pub fn evaluate(typed: &str, meanings: &[String]) -> Result<Evaluation> {
    if meanings.is_empty() {
        return Err(SrsError::NoAcceptableMeanings);
    }

    let typed = normalize(typed);
    let candidates = expand_candidates(meanings);

    // Empty input never passes, even against a meaning that normalizes to
    // nothing (e.g. a bare "～" placeholder).
    if typed.is_empty() || candidates.is_empty() {
        return Ok(Evaluation {
            best_match: candidates.into_iter().next().unwrap_or_default(),
            score: 0.0,
            passed: false,
        });
    }

    let mut best_match = candidates[0].clone();
    let mut best_score = normalized_similarity(&typed, &candidates[0]);
    for candidate in &candidates[1..] {
        let score = normalized_similarity(&typed, candidate);
        if score > best_score {
            best_score = score;
            best_match = candidate.clone();
        }
    }

    Ok(Evaluation {
        best_match,
        score: best_score,
        passed: best_score >= PASS_THRESHOLD,
    })
}

/// Expand meanings into normalized match candidates, preserving declaration
/// order: meaning 1 in full, meaning 1's parts, meaning 2 in full, and so on.
fn expand_candidates(meanings: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for meaning in meanings {
        let full = normalize(meaning);
        if !full.is_empty() && !candidates.contains(&full) {
            candidates.push(full);
        }
        for part in meaning.split(PART_DELIMITERS) {
            let part = normalize(part);
            if !part.is_empty() && !candidates.contains(&part) {
                candidates.push(part);
            }
        }
    }
    candidates
}

/// Normalize one side of a comparison: case-fold, drop the `～` placeholder,
/// trim surrounding punctuation, collapse whitespace.
fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let without_tilde: String = lowered.chars().filter(|c| !matches!(c, '～' | '~')).collect();
    without_tilde
        .trim_matches(|c: char| c.is_whitespace() || is_edge_punctuation(c))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_edge_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '。' | '、' | '！' | '？' | '「' | '」')
}

/// Levenshtein distance over Unicode scalar values.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix.
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity in [0, 1] based on Levenshtein distance.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0; // Both empty strings are identical
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meanings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("saturday", "sunday"), 3);
    }

    #[test]
    fn levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein_distance("てしまう", "てしまった"), 2);
        assert_eq!(normalized_similarity("ても", "ても"), 1.0);
    }

    #[test]
    fn identity_scores_full_marks() {
        let result = evaluate("To do completely", &meanings(&["to do completely"])).unwrap();
        assert_eq!(result.score, 1.0);
        assert!(result.passed);
        assert_eq!(result.best_match, "to do completely");
    }

    #[test]
    fn case_and_whitespace_never_affect_the_score() {
        let plain = evaluate("too", &meanings(&["too; also"])).unwrap();
        let noisy = evaluate("  TOO   ", &meanings(&["too; also"])).unwrap();
        assert_eq!(plain, noisy);
    }

    #[test]
    fn part_of_a_multi_part_meaning_passes() {
        let result = evaluate("too", &meanings(&["too; also"])).unwrap();
        assert!(result.passed, "score was {}", result.score);
        assert!(result.score >= PASS_THRESHOLD);
        assert_eq!(result.best_match, "too");

        let result = evaluate("also", &meanings(&["too; also"])).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn slash_variants_pass() {
        for answer in ["is", "am", "are"] {
            let result = evaluate(answer, &meanings(&["～ is/am/are ～"])).unwrap();
            assert!(result.passed, "{answer} scored {}", result.score);
        }
    }

    #[test]
    fn sentence_parts_are_their_own_candidates() {
        let meaning =
            "marks the place where an action takes place. Marks the means by which you do something.";
        let result = evaluate("marks the place where an action takes place", &meanings(&[meaning]))
            .unwrap();
        assert!(result.passed);
        assert_eq!(result.best_match, "marks the place where an action takes place");
    }

    #[test]
    fn unrelated_text_fails() {
        let result = evaluate("completely unrelated text", &meanings(&["meaning x"])).unwrap();
        assert!(!result.passed);
        assert!(result.score < PASS_THRESHOLD);
    }

    #[test]
    fn near_miss_typo_still_passes() {
        let result = evaluate("to do completly", &meanings(&["to do completely"])).unwrap();
        assert!(result.passed, "score was {}", result.score);
    }

    #[test]
    fn empty_typed_answer_fails_without_error() {
        let result = evaluate("", &meanings(&["too; also"])).unwrap();
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);

        let result = evaluate("   ", &meanings(&["too; also"])).unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn empty_meanings_is_a_caller_bug() {
        assert_eq!(evaluate("too", &[]), Err(SrsError::NoAcceptableMeanings));
    }

    #[test]
    fn first_maximal_candidate_wins_ties() {
        // "ab" scores 0.5 against both parts; the earlier one is reported.
        let result = evaluate("ab", &meanings(&["aa; bb"])).unwrap();
        assert_eq!(result.best_match, "aa");
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let first = evaluate("at, during", &meanings(&["at, during, etc."])).unwrap();
        let second = evaluate("at, during", &meanings(&["at, during, etc."])).unwrap();
        assert_eq!(first, second);
    }
}
