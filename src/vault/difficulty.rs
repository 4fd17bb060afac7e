//! Note age to difficulty tier
//!
//! Older notes make harder enemies. The mapping is pure and monotonic:
//! a week-old note is tier 1, and tiers climb through weeks, months and
//! quarters until they cap at 12.

use serde::{Deserialize, Serialize};

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 12;

/// Map a note's age in days to a difficulty tier in `1..=12`
pub fn difficulty(age_days: u32) -> u8 {
    let tier = if age_days < 7 {
        1
    } else if age_days < 30 {
        (2 + age_days / 7).min(6)
    } else if age_days < 90 {
        (7 + age_days / 30).min(9)
    } else {
        (10 + age_days / 90).min(12)
    };
    tier as u8
}

/// Coarse age bands used to flavor generated lore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeDescriptor {
    Fresh,
    Seasoned,
    Weathered,
    Ancient,
}

impl AgeDescriptor {
    pub fn from_difficulty(tier: u8) -> Self {
        match tier {
            0..=3 => AgeDescriptor::Fresh,
            4..=6 => AgeDescriptor::Seasoned,
            7..=9 => AgeDescriptor::Weathered,
            _ => AgeDescriptor::Ancient,
        }
    }

    /// Adjective used in names and backstories
    pub fn adjective(&self) -> &'static str {
        match self {
            AgeDescriptor::Fresh => "Newborn",
            AgeDescriptor::Seasoned => "Restless",
            AgeDescriptor::Weathered => "Dust-Veiled",
            AgeDescriptor::Ancient => "Ancient",
        }
    }

    pub fn span(&self) -> &'static str {
        match self {
            AgeDescriptor::Fresh => "only days",
            AgeDescriptor::Seasoned => "several weeks",
            AgeDescriptor::Weathered => "long months",
            AgeDescriptor::Ancient => "countless seasons",
        }
    }
}
