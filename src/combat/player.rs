//! Player character as seen by combat
//!
//! Persistence lives behind `session::CharacterStore`; this type only carries
//! the numbers combat reads and writes.

use serde::{Deserialize, Serialize};

use crate::combat::constants::*;
use crate::combat::resolution::Dice;
use crate::core::config::CombatConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassArchetype {
    DeathKnight,
    Mystic,
    Thief,
}

impl ClassArchetype {
    pub fn skill_name(&self) -> &'static str {
        match self {
            ClassArchetype::DeathKnight => "Death Strike",
            ClassArchetype::Mystic => "Mystical Blast",
            ClassArchetype::Thief => "Sneak Attack",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ClassArchetype::DeathKnight => "Death Knight",
            ClassArchetype::Mystic => "Mystic",
            ClassArchetype::Thief => "Thief",
        }
    }

    /// Parse a class from user input ("knight", "k", "mystic", ...)
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "k" | "knight" | "deathknight" | "death knight" | "death-knight" => {
                Some(ClassArchetype::DeathKnight)
            }
            "p" | "m" | "mystic" | "mystical" => Some(ClassArchetype::Mystic),
            "d" | "t" | "thief" | "thieving" => Some(ClassArchetype::Thief),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub class: ClassArchetype,
    pub level: u32,
    pub experience: u32,
    pub hitpoints: u32,
    pub max_hitpoints: u32,
    pub attack_power: u32,
    pub defense_power: u32,
    pub gold: u32,
    pub skill_points: u32,
    /// Skill uses spent since the last daily reset
    pub skill_uses_today: u32,
    pub daily_skill_uses: u32,
    /// Encounters left today
    pub forest_fights: u32,
    pub daily_forest_fights: u32,
    /// False after a defeat, until the next daily reset
    pub alive: bool,
    pub total_kills: u32,
}

impl Player {
    /// Level 1 character with default daily limits
    pub fn new(name: impl Into<String>, class: ClassArchetype) -> Self {
        Self::with_limits(name, class, &CombatConfig::default())
    }

    pub fn with_limits(name: impl Into<String>, class: ClassArchetype, limits: &CombatConfig) -> Self {
        Self {
            name: name.into(),
            class,
            level: 1,
            experience: 0,
            hitpoints: STARTING_HITPOINTS,
            max_hitpoints: STARTING_HITPOINTS,
            attack_power: BASE_WEAPON_POWER + ATTACK_PER_LEVEL,
            defense_power: BASE_ARMOR_POWER + DEFENSE_PER_LEVEL,
            gold: STARTING_GOLD,
            skill_points: 1,
            skill_uses_today: 0,
            daily_skill_uses: limits.daily_skill_uses,
            forest_fights: limits.daily_forest_fights,
            daily_forest_fights: limits.daily_forest_fights,
            alive: true,
            total_kills: 0,
        }
    }

    pub fn can_use_skill(&self) -> bool {
        self.skill_uses_today < self.daily_skill_uses
    }

    pub fn skill_uses_left(&self) -> u32 {
        self.daily_skill_uses.saturating_sub(self.skill_uses_today)
    }

    pub fn has_ultra_mastery(&self) -> bool {
        self.skill_points >= ULTRA_MASTERY_POINTS
    }

    /// Can this character start a new encounter?
    pub fn can_fight(&self) -> bool {
        self.alive && self.hitpoints > 0 && self.forest_fights > 0
    }

    pub fn can_level_up(&self) -> bool {
        if self.level >= MAX_LEVEL {
            return false;
        }
        self.experience >= LEVEL_EXP[self.level as usize]
    }

    /// Advance one level if eligible, returning the hitpoints gained
    pub fn level_up<D: Dice + ?Sized>(&mut self, dice: &mut D) -> Option<u32> {
        if !self.can_level_up() {
            return None;
        }
        let gain = dice.roll(LEVEL_UP_HP_GAIN_MIN, LEVEL_UP_HP_GAIN_MAX);
        self.level += 1;
        self.max_hitpoints += gain;
        self.hitpoints = self.max_hitpoints;
        self.attack_power += ATTACK_PER_LEVEL;
        self.defense_power += DEFENSE_PER_LEVEL;
        self.skill_points += 1;
        Some(gain)
    }

    /// New day: fights and skill uses restored, character revived
    pub fn daily_reset(&mut self) {
        self.forest_fights = self.daily_forest_fights;
        self.skill_uses_today = 0;
        self.alive = true;
        self.hitpoints = self.max_hitpoints;
    }
}
