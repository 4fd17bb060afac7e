//! Content analysis - turning note text into combat-relevant features
//!
//! Everything here is deterministic for a given input. The analyzer
//! classifies a note into a [`Domain`], scores its complexity and age
//! signals, picks a personality [`Archetype`] and extracts structured
//! details that downstream lore generation splices into its text.

pub mod details;
pub mod domain;
pub mod signals;

use std::collections::HashSet;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::vault::NoteRef;

pub use details::StructuredDetails;
pub use domain::Domain;
pub use signals::{length_bonus, AgeSignals, Archetype, ComplexitySignals};

/// Additive (hp, attack) adjustment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonus {
    pub hp: u32,
    pub attack: u32,
}

impl StatBonus {
    pub const fn new(hp: u32, attack: u32) -> Self {
        Self { hp, attack }
    }
}

impl Add for StatBonus {
    type Output = StatBonus;

    fn add(self, rhs: StatBonus) -> StatBonus {
        StatBonus::new(self.hp + rhs.hp, self.attack + rhs.attack)
    }
}

/// Everything the forge needs to know about a note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub domain: Domain,
    pub archetype: Archetype,
    pub content_bonus: StatBonus,
    pub length_bonus: StatBonus,
    pub complexity_bonus: StatBonus,
    pub age_bonus: StatBonus,
    pub details: StructuredDetails,
}

impl Features {
    /// Sum of all four bonuses
    pub fn total_bonus(&self) -> StatBonus {
        self.content_bonus + self.length_bonus + self.complexity_bonus + self.age_bonus
    }
}

/// Lowercased text plus its word tokens, built once per analysis
pub(crate) struct TextView<'a> {
    raw: &'a str,
    lower: String,
    tokens: HashSet<String>,
}

impl<'a> TextView<'a> {
    pub(crate) fn new(raw: &'a str) -> Self {
        let lower = raw.to_lowercase();
        let tokens = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { raw, lower, tokens }
    }

    /// Whole-word match for single words, substring match for phrases
    pub(crate) fn has_term(&self, term: &str) -> bool {
        if term.contains(' ') {
            self.lower.contains(term)
        } else {
            self.tokens.contains(term)
        }
    }

    /// Number of distinct terms present
    pub(crate) fn count_terms(&self, terms: &[&str]) -> usize {
        terms.iter().filter(|t| self.has_term(t)).count()
    }

    /// Total raw occurrences of each marker in the lowercased text
    pub(crate) fn count_occurrences(&self, markers: &[&str]) -> usize {
        markers.iter().map(|m| self.lower.matches(m).count()).sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentAnalyzer;

impl ContentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, note: &NoteRef) -> Features {
        let text = TextView::new(&note.content);

        let domain = Domain::classify(&text);
        let complexity = ComplexitySignals::measure(&text);
        let age = AgeSignals::measure(&text);

        Features {
            domain,
            archetype: Archetype::from_signals(domain, &complexity),
            content_bonus: domain.bonus(),
            length_bonus: length_bonus(note.content.chars().count()),
            complexity_bonus: complexity.bonus(),
            age_bonus: age.bonus(),
            details: StructuredDetails::extract(&note.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_technical_note() {
        let note = NoteRef::new(
            "Query Planner",
            "# Query Planner\nThe database algorithm picks an index.\n- scan\n- seek\n",
        );
        let features = ContentAnalyzer::new().analyze(&note);

        assert_eq!(features.domain, Domain::Technical);
        assert_eq!(features.archetype, Archetype::Artificer);
        assert_eq!(features.content_bonus, StatBonus::new(12, 8));
        assert_eq!(features.length_bonus, StatBonus::default());
        assert_eq!(features.details.list_items, vec!["scan", "seek"]);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let note = NoteRef::new("Journal", "Dear diary, 2021-04-05 was an old feeling.");
        let a = ContentAnalyzer::new().analyze(&note);
        let b = ContentAnalyzer::new().analyze(&note);
        assert_eq!(a, b);
        assert_eq!(a.domain, Domain::Personal);
    }

    #[test]
    fn test_total_bonus_sums_parts() {
        let features = ContentAnalyzer::new().analyze(&NoteRef::new("t", "plain words"));
        let total = features.total_bonus();
        assert_eq!(total, StatBonus::new(5, 3));
    }
}
