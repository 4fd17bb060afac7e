//! Knowledge domain taxonomy
//!
//! Domains are tested in a fixed priority order, highest first; the first
//! domain with a keyword present in the note wins. Single words match whole
//! tokens, multi-word phrases match as substrings of the lowercased text.

use serde::{Deserialize, Serialize};

use super::{StatBonus, TextView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Secrets,
    Technical,
    Finance,
    Business,
    Health,
    Culinary,
    Learning,
    Travel,
    Creative,
    Personal,
    Errands,
    General,
}

impl Domain {
    /// Every domain in classification priority order
    pub const PRIORITY: [Domain; 12] = [
        Domain::Secrets,
        Domain::Technical,
        Domain::Finance,
        Domain::Business,
        Domain::Health,
        Domain::Culinary,
        Domain::Learning,
        Domain::Travel,
        Domain::Creative,
        Domain::Personal,
        Domain::Errands,
        Domain::General,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Domain::Secrets => &[
                "password",
                "passwords",
                "secret",
                "secrets",
                "confidential",
                "private",
                "login",
                "credentials",
                "passphrase",
            ],
            Domain::Technical => &[
                "algorithm",
                "database",
                "api",
                "framework",
                "architecture",
                "code",
                "function",
                "programming",
                "software",
                "server",
                "network",
                "router",
                "compiler",
                "neural",
                "machine learning",
            ],
            Domain::Finance => &[
                "financial",
                "money",
                "budget",
                "investment",
                "salary",
                "tax",
                "taxes",
                "invoice",
                "mortgage",
            ],
            Domain::Business => &[
                "meeting", "project", "deadline", "strategy", "agenda", "office", "client",
                "roadmap", "quarterly",
            ],
            Domain::Health => &[
                "health",
                "medical",
                "doctor",
                "symptoms",
                "medication",
                "workout",
                "therapy",
            ],
            Domain::Culinary => &[
                "recipe", "recipes", "cook", "cooking", "ingredient", "ingredients", "bake",
                "flour", "food",
            ],
            Domain::Learning => &[
                "study", "lecture", "course", "lesson", "exam", "chapter", "homework", "syllabus",
            ],
            Domain::Travel => &[
                "travel",
                "trip",
                "journey",
                "flight",
                "hotel",
                "itinerary",
                "passport",
            ],
            Domain::Creative => &[
                "story", "poem", "poetry", "novel", "draft", "song", "lyrics", "sketch", "character",
            ],
            Domain::Personal => &[
                "dream",
                "journal",
                "diary",
                "feeling",
                "feelings",
                "family",
                "gratitude",
            ],
            Domain::Errands => &[
                "shopping", "groceries", "grocery", "reminder", "errand", "errands", "buy", "milk",
                "eggs", "bread", "chores", "todo",
            ],
            Domain::General => &[],
        }
    }

    /// Content-type stat bonus: guarded domains hit harder
    pub fn bonus(&self) -> StatBonus {
        let (hp, attack) = match self {
            Domain::Secrets => (15, 10),
            Domain::Technical => (12, 8),
            Domain::Finance => (10, 6),
            Domain::Business => (8, 5),
            Domain::Health => (8, 4),
            Domain::Culinary => (6, 7),
            Domain::Learning => (7, 4),
            Domain::Travel => (6, 4),
            Domain::Creative => (6, 5),
            Domain::Personal => (5, 3),
            Domain::Errands => (3, 2),
            Domain::General => (5, 3),
        };
        StatBonus::new(hp, attack)
    }

    /// Realm name used in narratives and combat messages
    pub fn realm(&self) -> &'static str {
        match self {
            Domain::Secrets => "Sealed Vaults",
            Domain::Technical => "Code Mysteries",
            Domain::Finance => "Coin Ledgers",
            Domain::Business => "Council Echoes",
            Domain::Health => "Vital Springs",
            Domain::Culinary => "Culinary Arts",
            Domain::Learning => "Scholar's Archive",
            Domain::Travel => "Wandering Roads",
            Domain::Creative => "Dream Canvas",
            Domain::Personal => "Memory Fragments",
            Domain::Errands => "Project Forge",
            Domain::General => "Forgotten Lore",
        }
    }

    pub(crate) fn matches(&self, text: &TextView<'_>) -> bool {
        self.keywords().iter().any(|k| text.has_term(k))
    }

    /// First domain in priority order that matches
    pub(crate) fn classify(text: &TextView<'_>) -> Domain {
        Domain::PRIORITY
            .iter()
            .copied()
            .find(|d| d.matches(text))
            .unwrap_or(Domain::General)
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.realm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Domain {
        Domain::classify(&TextView::new(text))
    }

    #[test]
    fn test_priority_order_resolves_overlap() {
        // Secrets outrank technical terms
        assert_eq!(classify("the database password is hunter2"), Domain::Secrets);
        assert_eq!(classify("budget for the project meeting"), Domain::Finance);
        assert_eq!(classify("buy milk after the meeting"), Domain::Business);
    }

    #[test]
    fn test_whole_word_matching() {
        // "codec" and "tipping" must not hit "code" or "trip"
        assert_eq!(classify("codec tipping"), Domain::General);
        assert_eq!(classify("Review the CODE."), Domain::Technical);
    }

    #[test]
    fn test_multi_word_phrase() {
        assert_eq!(classify("notes on machine learning basics"), Domain::Technical);
    }

    #[test]
    fn test_every_domain_reachable() {
        for domain in Domain::PRIORITY.iter().filter(|d| **d != Domain::General) {
            let sample = domain.keywords()[0];
            assert_eq!(classify(sample), *domain, "keyword {sample}");
        }
    }
}
