//! The enemy entity fought in one encounter

use serde::{Deserialize, Serialize};

use crate::analysis::Domain;
use crate::vault::NoteRef;

pub const MIN_ENEMY_HP: u32 = 8;
pub const MAX_ENEMY_HP: u32 = 120;
pub const MIN_ENEMY_ATTACK: u32 = 2;
pub const MAX_ENEMY_ATTACK: u32 = 60;

/// An ephemeral combat adversary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub hitpoints: u32,
    pub max_hitpoints: u32,
    pub attack: u32,
    pub gold_reward: u32,
    pub exp_reward: u32,
    pub level: u32,
    /// None for plain bestiary creatures
    pub domain: Option<Domain>,
    pub source: Option<NoteRef>,
    /// Age tier of the source note when the enemy was forged
    #[serde(default)]
    pub source_difficulty: Option<u8>,

    pub description: String,
    pub backstory: String,
    pub environment_description: String,
    pub encounter_narrative: String,
    pub weapon: String,
    pub armor: String,
    pub combat_phrases: Vec<String>,
    /// Shown when the enemy falls
    pub defeat_message: String,
    /// Shown when the enemy wins
    pub victory_message: String,
    /// Lore came from the generative backend
    pub ai_enriched: bool,
}

impl Enemy {
    /// Bare enemy with placeholder lore. Stats are taken as given.
    pub fn new(name: impl Into<String>, hitpoints: u32, attack: u32, gold_reward: u32) -> Self {
        let name = name.into();
        Self {
            description: format!("A hostile {} blocks your path.", name),
            backstory: String::new(),
            environment_description: "Forest Clearing".into(),
            encounter_narrative: format!("A {} steps out from between the trees.", name),
            weapon: "Claws".into(),
            armor: "Thick Hide".into(),
            combat_phrases: Vec::new(),
            defeat_message: format!("The {} collapses.", name),
            victory_message: format!("The {} stands over you.", name),
            hitpoints,
            max_hitpoints: hitpoints,
            attack,
            gold_reward,
            exp_reward: gold_reward / 2,
            level: 1,
            domain: None,
            source: None,
            source_difficulty: None,
            ai_enriched: false,
            name,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hitpoints > 0
    }

    /// Apply damage, saturating at zero
    pub fn take_damage(&mut self, damage: u32) {
        self.hitpoints = self.hitpoints.saturating_sub(damage);
    }

    pub fn title(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.title.as_str())
    }
}

/// Clamp forged stats to the playable band
pub fn clamp_stats(hitpoints: u32, attack: u32) -> (u32, u32) {
    (
        hitpoints.clamp(MIN_ENEMY_HP, MAX_ENEMY_HP),
        attack.clamp(MIN_ENEMY_ATTACK, MAX_ENEMY_ATTACK),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_enemy_rewards() {
        let enemy = Enemy::new("Raven", 25, 12, 101);
        assert_eq!(enemy.exp_reward, 50);
        assert_eq!(enemy.max_hitpoints, 25);
        assert!(enemy.is_alive());
    }

    #[test]
    fn test_damage_saturates() {
        let mut enemy = Enemy::new("Raven", 5, 1, 0);
        enemy.take_damage(10);
        assert_eq!(enemy.hitpoints, 0);
        assert!(!enemy.is_alive());
    }

    #[test]
    fn test_clamp_stats() {
        assert_eq!(clamp_stats(1, 0), (MIN_ENEMY_HP, MIN_ENEMY_ATTACK));
        assert_eq!(clamp_stats(10_000, 2_000), (MAX_ENEMY_HP, MAX_ENEMY_ATTACK));
        assert_eq!(clamp_stats(50, 20), (50, 20));
    }
}
