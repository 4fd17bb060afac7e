//! Forest bestiary - base enemy templates by level
//!
//! Template stats are the starting point only; the forge scales them by the
//! note's difficulty and clamps the result.

use serde::{Deserialize, Serialize};

/// Highest level with its own table; deeper levels reuse it
pub const MAX_BESTIARY_LEVEL: u32 = 12;

/// A base enemy template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub name: &'static str,
    pub hitpoints: u32,
    pub attack: u32,
    pub gold: u32,
}

const fn t(name: &'static str, hitpoints: u32, attack: u32, gold: u32) -> EnemyTemplate {
    EnemyTemplate {
        name,
        hitpoints,
        attack,
        gold,
    }
}

/// Used only if a level table were ever empty
pub const FALLBACK_TEMPLATE: EnemyTemplate = t("Small Thief", 15, 5, 50);

const LEVEL_1: &[EnemyTemplate] = &[
    t("Small Thief", 15, 5, 50),
    t("Wild Boar", 20, 8, 75),
    t("Large Mosquito", 10, 3, 25),
    t("Old Man", 25, 10, 100),
];
const LEVEL_2: &[EnemyTemplate] = &[
    t("Large Thief", 35, 15, 150),
    t("Raven", 25, 12, 100),
    t("Ugly Troll", 50, 20, 250),
];
const LEVEL_3: &[EnemyTemplate] = &[
    t("Orc", 75, 30, 400),
    t("Skeleton", 60, 25, 350),
    t("Lizard Man", 80, 35, 450),
];
const LEVEL_4: &[EnemyTemplate] = &[
    t("Hobgoblin", 120, 50, 600),
    t("Stone Golem", 150, 40, 750),
    t("Gargoyle", 100, 60, 550),
];
const LEVEL_5: &[EnemyTemplate] = &[
    t("Minotaur", 200, 80, 1000),
    t("Cyclops", 250, 70, 1200),
    t("Giant Spider", 180, 90, 900),
];
const LEVEL_6: &[EnemyTemplate] = &[
    t("Evil Mage", 300, 120, 1500),
    t("Demon", 350, 100, 1750),
    t("Dark Knight", 400, 150, 2000),
];
const LEVEL_7: &[EnemyTemplate] = &[
    t("Vampire", 500, 180, 2500),
    t("Werewolf", 450, 200, 2250),
    t("Lich", 550, 160, 2750),
];
const LEVEL_8: &[EnemyTemplate] = &[
    t("Dragon Whelp", 700, 250, 3500),
    t("Pit Fiend", 800, 220, 4000),
    t("Bone Dragon", 750, 280, 3750),
];
const LEVEL_9: &[EnemyTemplate] = &[
    t("Young Dragon", 1000, 350, 5000),
    t("Balrog", 1200, 300, 6000),
    t("Death Knight", 1100, 400, 5500),
];
const LEVEL_10: &[EnemyTemplate] = &[
    t("Ancient Dragon", 1500, 500, 7500),
    t("Archdemon", 1800, 450, 9000),
    t("Dracolich", 1700, 550, 8500),
];
const LEVEL_11: &[EnemyTemplate] = &[
    t("Titan", 2500, 700, 12500),
    t("Avatar of Death", 3000, 650, 15000),
    t("Primordial", 2800, 750, 14000),
];
const LEVEL_12: &[EnemyTemplate] = &[t("The Red Dragon", 10000, 2000, 50000)];

/// Templates for a level. Level 0 reads as 1, levels past 12 use the last table.
pub fn templates_for_level(level: u32) -> &'static [EnemyTemplate] {
    match level.clamp(1, MAX_BESTIARY_LEVEL) {
        1 => LEVEL_1,
        2 => LEVEL_2,
        3 => LEVEL_3,
        4 => LEVEL_4,
        5 => LEVEL_5,
        6 => LEVEL_6,
        7 => LEVEL_7,
        8 => LEVEL_8,
        9 => LEVEL_9,
        10 => LEVEL_10,
        11 => LEVEL_11,
        _ => LEVEL_12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_level_has_templates() {
        for level in 0..=20 {
            assert!(!templates_for_level(level).is_empty(), "level {level}");
        }
    }

    #[test]
    fn test_level_clamping() {
        assert_eq!(templates_for_level(0), templates_for_level(1));
        assert_eq!(templates_for_level(30)[0].name, "The Red Dragon");
        assert_eq!(templates_for_level(1)[1].name, "Wild Boar");
    }

    #[test]
    fn test_gold_rises_with_level() {
        let max_gold = |level| templates_for_level(level).iter().map(|t| t.gold).max();
        for level in 1..MAX_BESTIARY_LEVEL {
            assert!(max_gold(level) < max_gold(level + 1));
        }
    }
}
