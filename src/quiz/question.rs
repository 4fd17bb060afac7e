//! Quiz question types

use serde::{Deserialize, Serialize};

use super::validate;

/// Note content kept as question context
pub const CONTEXT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    Definition,
    Concept,
    Relationship,
    Fact,
    ListItem,
    Completion,
    Reflection,
}

impl QuestionKind {
    /// Map a generated TYPE label; unknown labels read as Concept
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "definition" => QuestionKind::Definition,
            "relationship" => QuestionKind::Relationship,
            "fact" => QuestionKind::Fact,
            _ => QuestionKind::Concept,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: u8,
    pub kind: QuestionKind,
    /// Opening of the source note
    pub context: String,
    pub ai_generated: bool,
}

impl QuizQuestion {
    /// Check a player's answer against this question
    pub fn check(&self, user_answer: &str) -> bool {
        validate(user_answer, &self.answer, self.ai_generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_label() {
        assert_eq!(QuestionKind::from_label("Definition"), QuestionKind::Definition);
        assert_eq!(QuestionKind::from_label(" fact "), QuestionKind::Fact);
        assert_eq!(QuestionKind::from_label("riddle"), QuestionKind::Concept);
    }
}
