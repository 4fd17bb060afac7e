//! Damage resolution
//!
//! Every roll goes through [`Dice`] so an encounter can be replayed with
//! loaded dice. Formulas here are pure; the engine decides when they apply.

use rand::Rng;

use crate::combat::constants::{QUIZ_DAMAGE_MULTIPLIER, SKILL_POINT_BONUS};
use crate::combat::player::{ClassArchetype, Player};

/// Source of randomness for combat
pub trait Dice {
    /// Uniform integer in `low..=high`; `low` when the range is empty
    fn roll(&mut self, low: u32, high: u32) -> u32;
    /// Uniform float in `low..high`; `low` when the range is empty
    fn uniform(&mut self, low: f64, high: f64) -> f64;
    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool;
    /// Index into a non-empty list of `len` items
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: Rng> Dice for R {
    fn roll(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.gen_range(low..high)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.gen_bool(p.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.gen_range(0..len)
    }
}

/// Normal attack: uniform(1, attack_power)
pub fn attack_damage<D: Dice + ?Sized>(player: &Player, dice: &mut D) -> u32 {
    dice.roll(1, player.attack_power.max(1))
}

/// Class skill: attack × (1 + skill_points × 0.05) × class range, floored
pub fn skill_damage<D: Dice + ?Sized>(player: &Player, dice: &mut D) -> u32 {
    let (low, high) = player.class.skill_range();
    let mastery = 1.0 + player.skill_points as f64 * SKILL_POINT_BONUS;
    let roll = dice.uniform(low, high);
    (player.attack_power as f64 * mastery * roll).floor() as u32
}

/// Quiz attack: fixed multiple of attack power, nothing on a wrong answer
pub fn quiz_damage(player: &Player, correct: bool) -> u32 {
    if correct {
        player.attack_power * QUIZ_DAMAGE_MULTIPLIER
    } else {
        0
    }
}

/// Enemy attack: max(1, uniform(1, attack) - defense / 2)
pub fn enemy_damage<D: Dice + ?Sized>(enemy_attack: u32, player: &Player, dice: &mut D) -> u32 {
    let raw = dice.roll(1, enemy_attack.max(1));
    raw.saturating_sub(player.defense_power / 2).max(1)
}

impl ClassArchetype {
    /// Multiplier range rolled for the class skill
    pub fn skill_range(&self) -> (f64, f64) {
        match self {
            ClassArchetype::DeathKnight => (1.5, 2.5),
            ClassArchetype::Mystic => (1.3, 2.0),
            ClassArchetype::Thief => (1.2, 2.2),
        }
    }
}
