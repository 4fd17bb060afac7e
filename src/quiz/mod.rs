//! Quiz engine - knowledge questions drawn from notes
//!
//! A correct answer powers the player's quiz attack. Questions come from
//! the generative backend when it is ready, otherwise from a regex cascade
//! over the note text. Either way they are cached per (note, difficulty).

pub mod fallback;
pub mod question;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::cache::{CacheKey, CacheStats, Operation, ResponseCache};
use crate::core::config::GameConfig;
use crate::llm::prompt::quiz_prompt;
use crate::llm::{GenerationKind, GenerativeClient, QuizReply};
use crate::vault::note::truncate_chars;
use crate::vault::NoteRef;

pub use fallback::draft_question;
pub use question::{QuestionKind, QuizQuestion, CONTEXT_CHARS};

/// Tokens this short carry no meaning for answer matching
const SIGNIFICANT_TOKEN_CHARS: usize = 2;
/// Share of the correct answer's tokens needed in ai mode
const AI_TOKEN_OVERLAP: f64 = 0.5;

/// Check `user_answer` against `correct_answer`.
///
/// An exact (case-insensitive, trimmed) match always passes. In `ai_mode`,
/// half of the correct answer's significant tokens appearing among the
/// user's tokens also passes. Finally any significant token of the correct
/// answer found inside the user's answer passes.
pub fn validate(user_answer: &str, correct_answer: &str, ai_mode: bool) -> bool {
    let user = user_answer.trim().to_lowercase();
    let correct = correct_answer.trim().to_lowercase();

    if user == correct {
        return true;
    }

    let correct_tokens = significant_tokens(&correct);
    if ai_mode && !correct_tokens.is_empty() {
        let user_tokens = significant_tokens(&user);
        let shared = correct_tokens.intersection(&user_tokens).count();
        if shared as f64 / correct_tokens.len() as f64 >= AI_TOKEN_OVERLAP {
            return true;
        }
    }

    correct_tokens.iter().any(|t| user.contains(t.as_str()))
}

fn significant_tokens(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > SIGNIFICANT_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

pub struct QuizEngine {
    client: Arc<GenerativeClient>,
    cache: ResponseCache<QuizQuestion>,
    rng: ChaCha8Rng,
    availability_wait: Duration,
    max_tokens: u32,
}

impl QuizEngine {
    pub fn new(client: Arc<GenerativeClient>, config: &GameConfig, seed: u64) -> Self {
        Self {
            client,
            cache: ResponseCache::new(config.quiz_ttl(), config.cache.soft_capacity),
            rng: ChaCha8Rng::seed_from_u64(seed),
            availability_wait: config.quiz_wait(),
            max_tokens: config.generation.quiz_max_tokens,
        }
    }

    /// A question about `note` at `difficulty`
    pub fn generate(&mut self, note: &NoteRef, difficulty: u8) -> QuizQuestion {
        let key = CacheKey::new(Operation::Quiz, note.title.clone(), difficulty as u32);
        if let Some(question) = self.cache.get(&key) {
            return question;
        }

        let context = truncate_chars(&note.content, CONTEXT_CHARS);
        let question = match self.generated(note) {
            Some(reply) => QuizQuestion {
                question: reply.question,
                answer: reply.answer,
                difficulty,
                kind: reply
                    .kind
                    .as_deref()
                    .map(QuestionKind::from_label)
                    .unwrap_or(QuestionKind::Concept),
                context,
                ai_generated: true,
            },
            None => {
                let drafted = draft_question(&note.title, &note.content, &mut self.rng);
                QuizQuestion {
                    question: drafted.question,
                    answer: drafted.answer,
                    difficulty,
                    kind: drafted.kind,
                    context,
                    ai_generated: false,
                }
            }
        };

        debug!(
            "Quiz for '{}' ({:?}, ai {})",
            note.title, question.kind, question.ai_generated
        );
        self.cache.insert(key, question.clone());
        question
    }

    fn generated(&self, note: &NoteRef) -> Option<QuizReply> {
        if !self.client.is_available(self.availability_wait) {
            return None;
        }
        let prompt = quiz_prompt(&note.title, &note.content);
        let text = self
            .client
            .generate(&prompt, self.max_tokens, GenerationKind::Quiz)?;
        let reply = QuizReply::parse(&text);
        if reply.is_none() {
            debug!("Unparseable quiz reply, using regex cascade");
        }
        reply
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn sweep_expired(&mut self) -> usize {
        self.cache.sweep_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedBackend;

    #[test]
    fn test_exact_match() {
        assert!(validate("Python", "Python", false));
        assert!(validate("  python ", "PYTHON", false));
    }

    #[test]
    fn test_no_shared_token_fails() {
        assert!(!validate("a reptile that codes", "A programming language", false));
    }

    #[test]
    fn test_shared_token_passes() {
        assert!(validate("some language", "A programming language", false));
    }

    #[test]
    fn test_short_tokens_ignored() {
        assert!(!validate("an ox", "an elk", false));
    }

    #[test]
    fn test_ai_mode_overlap() {
        // 2 of 3 significant tokens
        assert!(validate("ada wrote notes", "Ada Lovelace wrote", true));
        // Punctuation does not block a match
        assert!(validate("lovelace", "Lovelace.", true));
    }

    #[test]
    fn test_engine_falls_back_when_disabled() {
        let client = Arc::new(GenerativeClient::disabled());
        client.initialize();
        let mut engine = QuizEngine::new(client, &GameConfig::default(), 1);

        let q = engine.generate(&NoteRef::new("Lang", "Rust is a systems language."), 2);
        assert!(!q.ai_generated);
        assert_eq!(q.question, "What is rust?");
        assert_eq!(q.difficulty, 2);
        assert!(q.check("a systems language"));
    }

    #[test]
    fn test_engine_uses_backend_and_caches() {
        let backend = Arc::new(ScriptedBackend::repeating(
            "QUESTION: What does Rust guarantee?\nANSWER: memory safety\nTYPE: fact",
        ));
        let client = Arc::new(GenerativeClient::with_backend(
            backend.clone(),
            Duration::from_secs(2),
        ));
        client.initialize();
        let mut engine = QuizEngine::new(client, &GameConfig::default(), 1);
        let note = NoteRef::new("Rust", "Rust is a systems language.");

        let first = engine.generate(&note, 1);
        let second = engine.generate(&note, 1);
        assert!(first.ai_generated);
        assert_eq!(first.kind, QuestionKind::Fact);
        assert_eq!(first, second);
        assert_eq!(backend.calls(), 1);
        assert_eq!(engine.cache_stats().hits, 1);
    }

    #[test]
    fn test_unparseable_reply_falls_back() {
        let backend = Arc::new(ScriptedBackend::repeating("I cannot help with that."));
        let client = Arc::new(GenerativeClient::with_backend(backend, Duration::from_secs(2)));
        client.initialize();
        let mut engine = QuizEngine::new(client, &GameConfig::default(), 1);

        let q = engine.generate(&NoteRef::new("Groceries", "- eggs\n- flour"), 1);
        assert!(!q.ai_generated);
        assert_eq!(q.kind, QuestionKind::ListItem);
    }
}
