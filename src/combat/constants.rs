//! Combat system constants - all tunable values in one place

// Fresh character
pub const STARTING_HITPOINTS: u32 = 20;
pub const STARTING_GOLD: u32 = 500;
pub const BASE_WEAPON_POWER: u32 = 5;
pub const BASE_ARMOR_POWER: u32 = 5;

// Growth per level (ADDITIVE)
pub const ATTACK_PER_LEVEL: u32 = 2;
pub const DEFENSE_PER_LEVEL: u32 = 1;
pub const LEVEL_UP_HP_GAIN_MIN: u32 = 10;
pub const LEVEL_UP_HP_GAIN_MAX: u32 = 20;

pub const MAX_LEVEL: u32 = 12;

/// Experience needed to leave level `n` is `LEVEL_EXP[n]`
pub const LEVEL_EXP: [u32; 13] = [
    0, 100, 400, 1000, 2000, 4000, 8000, 16000, 32000, 64000, 128000, 256000, 512000,
];

// Skills
pub const SKILL_POINT_BONUS: f64 = 0.05;
pub const ULTRA_MASTERY_POINTS: u32 = 40;

/// A correct quiz answer hits for this many times attack power
pub const QUIZ_DAMAGE_MULTIPLIER: u32 = 2;
