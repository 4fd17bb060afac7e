//! Parsed vault notes

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::difficulty::difficulty;

/// Content kept on an enemy's source reference
pub const SOURCE_SNIPPET_CHARS: usize = 500;

/// A parsed vault document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// File path, also the note's identity
    pub path: PathBuf,
    pub title: String,
    pub content: String,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
    pub tags: BTreeSet<String>,
}

impl Note {
    /// Days since last modification (never negative)
    pub fn age_days(&self) -> u32 {
        self.age_days_at(Local::now())
    }

    pub fn age_days_at(&self, now: DateTime<Local>) -> u32 {
        let days = (now - self.modified).num_days();
        days.clamp(0, u32::MAX as i64) as u32
    }

    /// Difficulty tier (1-12) derived from age
    pub fn difficulty_level(&self) -> u8 {
        difficulty(self.age_days())
    }

    pub fn difficulty_level_at(&self, now: DateTime<Local>) -> u8 {
        difficulty(self.age_days_at(now))
    }

    /// Full-text reference to this note
    pub fn to_ref(&self) -> NoteRef {
        NoteRef::new(self.title.clone(), self.content.clone())
    }

    /// Reference with content cut down for attaching to an enemy
    pub fn snippet_ref(&self) -> NoteRef {
        NoteRef::new(
            self.title.clone(),
            truncate_chars(&self.content, SOURCE_SNIPPET_CHARS),
        )
    }
}

/// The minimal view of a note: just its title and text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRef {
    pub title: String,
    pub content: String,
}

impl NoteRef {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Take at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn note_modified(days_ago: i64) -> Note {
        let now = Local::now();
        Note {
            path: PathBuf::from("vault/test.md"),
            title: "Test".into(),
            content: "body".into(),
            created: now - Duration::days(days_ago),
            modified: now - Duration::days(days_ago),
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn test_age_and_difficulty() {
        let note = note_modified(45);
        let now = note.modified + Duration::days(45);
        assert_eq!(note.age_days_at(now), 45);
        assert_eq!(note.difficulty_level_at(now), 8);
    }

    #[test]
    fn test_future_modification_counts_as_zero_days() {
        let note = note_modified(-3);
        assert_eq!(note.age_days(), 0);
        assert_eq!(note.difficulty_level(), 1);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_snippet_ref_truncates() {
        let mut note = note_modified(1);
        note.content = "x".repeat(SOURCE_SNIPPET_CHARS + 50);
        assert_eq!(note.snippet_ref().content.len(), SOURCE_SNIPPET_CHARS);
        assert_eq!(note.to_ref().content.len(), SOURCE_SNIPPET_CHARS + 50);
    }
}
