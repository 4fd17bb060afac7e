//! Complexity, age and length signals

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Domain, StatBonus, TextView};

const TECHNICAL_WORDS: &[&str] = &[
    "function",
    "class",
    "variable",
    "algorithm",
    "database",
    "api",
    "framework",
    "implementation",
];
const EMOTIONAL_WORDS: &[&str] = &[
    "feeling",
    "emotion",
    "anxiety",
    "stress",
    "happiness",
    "sadness",
    "anger",
    "fear",
];
const CONCEPTUAL_WORDS: &[&str] = &[
    "analysis",
    "theory",
    "concept",
    "philosophy",
    "principle",
    "methodology",
    "paradigm",
];
const LINK_MARKERS: &[&str] = &["http", "www.", ".com"];
const LIST_MARKERS: &[&str] = &["- ", "* ", "1. "];

const ESTABLISHMENT_WORDS: &[&str] = &[
    "established",
    "founded",
    "historical",
    "legacy",
    "traditional",
    "classic",
    "original",
];
const REFERENCE_WORDS: &[&str] = &["reference", "source", "citation"];
const LONG_TERM_WORDS: &[&str] = &[
    "always",
    "never",
    "forever",
    "permanent",
    "eternal",
    "ancient",
    "old",
];

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}")
        .expect("valid date regex")
});

/// Raw hit counts behind the complexity score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexitySignals {
    pub technical: usize,
    pub emotional: usize,
    pub conceptual: usize,
    pub links: usize,
    pub list_markers: usize,
}

impl ComplexitySignals {
    pub(crate) fn measure(text: &TextView<'_>) -> Self {
        Self {
            technical: text.count_terms(TECHNICAL_WORDS),
            emotional: text.count_terms(EMOTIONAL_WORDS),
            conceptual: text.count_terms(CONCEPTUAL_WORDS),
            links: text.count_occurrences(LINK_MARKERS),
            list_markers: text.count_occurrences(LIST_MARKERS),
        }
    }

    /// Weighted contributions, in archetype order
    fn weighted(&self) -> [(Archetype, f64); 5] {
        [
            (Archetype::Artificer, self.technical as f64),
            (Archetype::Sage, self.conceptual as f64 * 1.5),
            (Archetype::Mourner, self.emotional as f64 * 0.5),
            (Archetype::Weaver, self.links as f64 * 0.5),
            (Archetype::Hoarder, self.list_markers as f64 * 0.3),
        ]
    }

    pub fn score(&self) -> f64 {
        self.weighted().iter().map(|(_, s)| s).sum()
    }

    pub fn bonus(&self) -> StatBonus {
        let score = self.score();
        StatBonus::new(
            ((score * 2.0) as u32).min(25),
            ((score * 1.2) as u32).min(15),
        )
    }
}

/// Signals that a note holds old or settled knowledge
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgeSignals {
    pub dates: usize,
    pub establishment: usize,
    pub references: usize,
    pub long_term: usize,
}

impl AgeSignals {
    pub(crate) fn measure(text: &TextView<'_>) -> Self {
        Self {
            dates: DATE_RE.find_iter(text.raw).count(),
            establishment: text.count_terms(ESTABLISHMENT_WORDS),
            references: text.count_occurrences(REFERENCE_WORDS),
            long_term: text.count_terms(LONG_TERM_WORDS),
        }
    }

    pub fn score(&self) -> f64 {
        (self.dates * 2 + self.establishment * 2 + self.references + self.long_term) as f64
    }

    pub fn bonus(&self) -> StatBonus {
        let score = self.score();
        StatBonus::new(
            ((score * 1.5) as u32).min(15),
            ((score * 0.8) as u32).min(8),
        )
    }
}

/// Longer notes hold more, so they last longer and hit harder
pub fn length_bonus(chars: usize) -> StatBonus {
    match chars {
        n if n > 2000 => StatBonus::new(20, 8),
        n if n > 1000 => StatBonus::new(10, 4),
        n if n > 500 => StatBonus::new(5, 2),
        _ => StatBonus::default(),
    }
}

/// Personality flavoring drawn from a note's dominant signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Guards secrets
    Sentinel,
    /// Built from technical vocabulary
    Artificer,
    /// Abstract, conceptual notes
    Sage,
    /// Emotionally heavy notes
    Mourner,
    /// Link-dense notes
    Weaver,
    /// List-heavy notes
    Hoarder,
    Wanderer,
}

impl Archetype {
    pub fn from_signals(domain: Domain, signals: &ComplexitySignals) -> Self {
        if domain == Domain::Secrets {
            return Archetype::Sentinel;
        }

        // Strictly greater keeps the earlier archetype on ties
        let mut best = (Archetype::Wanderer, 0.0);
        for (archetype, score) in signals.weighted() {
            if score > best.1 {
                best = (archetype, score);
            }
        }
        best.0
    }

    pub fn title(&self) -> &'static str {
        match self {
            Archetype::Sentinel => "Sentinel",
            Archetype::Artificer => "Artificer",
            Archetype::Sage => "Sage",
            Archetype::Mourner => "Mourner",
            Archetype::Weaver => "Weaver",
            Archetype::Hoarder => "Hoarder",
            Archetype::Wanderer => "Wanderer",
        }
    }

    /// How the creature carries itself, for descriptions
    pub fn demeanor(&self) -> &'static str {
        match self {
            Archetype::Sentinel => "watches every approach with unblinking suspicion",
            Archetype::Artificer => "tinkers endlessly with humming, half-built contraptions",
            Archetype::Sage => "speaks in riddles that fold back on themselves",
            Archetype::Mourner => "trails a cold mist of old sorrow",
            Archetype::Weaver => "pulls at glowing threads that vanish into the distance",
            Archetype::Hoarder => "clutches bundles of scraps it refuses to let go",
            Archetype::Wanderer => "drifts aimlessly, as if searching for something lost",
        }
    }
}
