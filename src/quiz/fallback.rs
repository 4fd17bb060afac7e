//! Regex cascade for questions without a generative backend
//!
//! Tried in order on the lowercased note: a definition ("X is Y"), a list
//! item, a completion of the first sentence, then a small fixed bank.

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use super::question::QuestionKind;
use crate::vault::note::truncate_chars;

const ANSWER_CHARS: usize = 50;
/// The first sentence must be shorter than this to become a completion
const COMPLETION_MAX_CHARS: usize = 100;
/// Characters shown before the blank in a completion question
const COMPLETION_SPLIT: usize = 50;

static DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+?)\s+is\s+(.+?)[.\n]").expect("valid definition regex"));
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-*]\s+(.+)").expect("valid list regex"));
static FIRST_SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^.!?]+[.!?])").expect("valid sentence regex"));

/// A question and answer before difficulty and context are attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drafted {
    pub question: String,
    pub answer: String,
    pub kind: QuestionKind,
}

impl Drafted {
    fn new(question: String, answer: String, kind: QuestionKind) -> Self {
        Self {
            question,
            answer,
            kind,
        }
    }
}

pub fn draft_question<R: Rng>(title: &str, content: &str, rng: &mut R) -> Drafted {
    let lower = content.to_lowercase();

    definition(&lower)
        .or_else(|| list_item(title, &lower))
        .or_else(|| completion(&lower))
        .unwrap_or_else(|| from_bank(title, rng))
}

fn definition(lower: &str) -> Option<Drafted> {
    let caps = DEFINITION_RE.captures(lower)?;
    let concept = caps[1].trim().trim_start_matches(['#', '-', '*', '>']).trim();
    let meaning = truncate_chars(caps[2].trim(), ANSWER_CHARS);
    if concept.is_empty() || meaning.trim().is_empty() {
        return None;
    }
    Some(Drafted::new(
        format!("What is {}?", concept),
        meaning.trim().to_string(),
        QuestionKind::Definition,
    ))
}

fn list_item(title: &str, lower: &str) -> Option<Drafted> {
    let caps = LIST_ITEM_RE.captures(lower)?;
    let item = truncate_chars(caps[1].trim(), ANSWER_CHARS);
    if item.is_empty() {
        return None;
    }
    Some(Drafted::new(
        format!("Name something related to {}", title),
        item,
        QuestionKind::ListItem,
    ))
}

fn completion(lower: &str) -> Option<Drafted> {
    let caps = FIRST_SENTENCE_RE.captures(lower.trim())?;
    let sentence = caps[1].trim();
    let len = sentence.chars().count();
    // Long enough that something remains to be completed
    if len >= COMPLETION_MAX_CHARS || len <= COMPLETION_SPLIT {
        return None;
    }

    let shown = truncate_chars(sentence, COMPLETION_SPLIT);
    let rest: String = sentence
        .chars()
        .skip(COMPLETION_SPLIT)
        .take(COMPLETION_MAX_CHARS - COMPLETION_SPLIT)
        .collect();
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    Some(Drafted::new(
        format!("Complete: {}...", shown),
        rest.to_string(),
        QuestionKind::Completion,
    ))
}

fn from_bank<R: Rng>(title: &str, rng: &mut R) -> Drafted {
    let bank = [
        (format!("What category does {} belong to?", title), "knowledge"),
        (format!("When did you last think about {}?", title), "recently"),
        (format!("Why is {} important?", title), "learning"),
    ];
    let (question, answer) = bank
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| (title.to_string(), "knowledge"));
    Drafted::new(question, answer.to_string(), QuestionKind::Reflection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn draft(title: &str, content: &str) -> Drafted {
        draft_question(title, content, &mut ChaCha8Rng::seed_from_u64(0))
    }

    #[test]
    fn test_definition_first() {
        let d = draft("Lang", "Python is a programming language.\n- snakes");
        assert_eq!(d.question, "What is python?");
        assert_eq!(d.answer, "a programming language");
        assert_eq!(d.kind, QuestionKind::Definition);
    }

    #[test]
    fn test_definition_answer_truncated() {
        let long = format!("Rust is {}.", "very ".repeat(30));
        let d = draft("Rust", &long);
        assert!(d.answer.chars().count() <= ANSWER_CHARS);
    }

    #[test]
    fn test_list_item() {
        let d = draft("Groceries", "- Oat milk\n- Bread");
        assert_eq!(d.question, "Name something related to Groceries");
        assert_eq!(d.answer, "oat milk");
        assert_eq!(d.kind, QuestionKind::ListItem);
    }

    #[test]
    fn test_first_sentence_completion() {
        let d = draft("Log", "Today we walked along the harbour until the lights came on. Then home.");
        assert_eq!(d.kind, QuestionKind::Completion);
        assert_eq!(
            d.question,
            "Complete: today we walked along the harbour until the lights..."
        );
        assert_eq!(d.answer, "came on.");
    }

    #[test]
    fn test_short_sentence_falls_to_bank() {
        let d = draft("Ideas", "Short thought.");
        assert_eq!(d.kind, QuestionKind::Reflection);
        assert!(["knowledge", "recently", "learning"].contains(&d.answer.as_str()));
        assert!(d.question.contains("Ideas"));
    }

    #[test]
    fn test_empty_content_uses_bank() {
        assert_eq!(draft("Empty", "").kind, QuestionKind::Reflection);
    }
}
