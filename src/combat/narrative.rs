//! Combat narration flavored by the enemy's knowledge domain

use crate::analysis::Domain;
use crate::combat::player::{ClassArchetype, Player};
use crate::combat::resolution::Dice;
use crate::forge::enemy::Enemy;

fn choose<D: Dice + ?Sized>(lines: Vec<String>, dice: &mut D) -> String {
    let index = dice.pick(lines.len());
    lines.into_iter().nth(index).unwrap_or_default()
}

/// Player's normal attack
pub fn player_attack<D: Dice + ?Sized>(enemy: &Enemy, damage: u32, dice: &mut D) -> String {
    let Some(domain) = enemy.domain else {
        return format!("You strike for {} damage!", damage);
    };

    let lines = match domain {
        Domain::Technical => vec![
            format!("Your programming logic cuts through the guardian's defensive syntax for {} insight!", damage),
            format!("You exploit a logical vulnerability, dealing {} computational damage!", damage),
            format!("Your understanding of algorithms pierces through for {} processing power!", damage),
        ],
        Domain::Personal => vec![
            format!("Your empathy connects with buried memories, dealing {} emotional resonance!", damage),
            format!("You channel personal understanding for {} heartfelt damage!", damage),
            format!("Your compassion breaks through protective barriers for {} soul damage!", damage),
        ],
        Domain::Business => vec![
            format!("Your leadership experience counters their authority for {} decisive damage!", damage),
            format!("You challenge their organizational structure, dealing {} hierarchical disruption!", damage),
            format!("Your diplomatic skills break through for {} persuasive impact!", damage),
        ],
        Domain::Errands => vec![
            format!("Your project management skills disrupt their workflow for {} efficiency damage!", damage),
            format!("You apply methodical precision, dealing {} structured impact!", damage),
            format!("Your organizational prowess cuts through chaos for {} systematic damage!", damage),
        ],
        other => {
            let realm = other.realm();
            vec![
                format!("Your knowledge of {} strikes true for {} wisdom damage!", realm, damage),
                format!("You channel understanding of {}, dealing {} intellectual impact!", realm, damage),
                format!("Your comprehension pierces their defenses for {} enlightenment damage!", damage),
            ]
        }
    };
    choose(lines, dice)
}

/// Player's class skill
pub fn player_skill(enemy: &Enemy, player: &Player, damage: u32) -> String {
    let mastery = if player.has_ultra_mastery() { " **ULTRA MASTERY!**" } else { "" };
    let skill = player.class.skill_name();

    let Some(domain) = enemy.domain else {
        return format!("{}! You hit for {} damage!{}", skill, damage, mastery);
    };
    let realm = domain.realm();

    match player.class {
        ClassArchetype::DeathKnight => format!(
            "Your Death Knight mastery channels through {}, unleashing {} necromantic force!{}",
            realm, damage, mastery
        ),
        ClassArchetype::Mystic => format!(
            "Your mystical energies resonate with {}, dealing {} arcane damage!{}",
            realm, damage, mastery
        ),
        ClassArchetype::Thief => format!(
            "You slip past their defenses using knowledge of {} for {} cunning damage!{}",
            realm, damage, mastery
        ),
    }
}

pub fn player_quiz(damage: u32) -> String {
    if damage > 0 {
        format!("**CRITICAL HIT** You remember and strike for {} damage!", damage)
    } else {
        "Your knowledge fails you! No damage dealt.".to_string()
    }
}

/// Enemy's attack. With `phrase_chance` the enemy speaks one of its lines.
pub fn enemy_attack<D: Dice + ?Sized>(
    enemy: &Enemy,
    damage: u32,
    phrase_chance: f64,
    dice: &mut D,
) -> String {
    if !enemy.combat_phrases.is_empty() && dice.chance(phrase_chance) {
        let phrase = &enemy.combat_phrases[dice.pick(enemy.combat_phrases.len())];
        return format!(
            "{} snarls: \"{}\" - The attack deals {} damage!",
            enemy.name, phrase, damage
        );
    }

    let Some(domain) = enemy.domain else {
        return format!("{} attacks you for {} damage!", enemy.name, damage);
    };

    let name = &enemy.name;
    let lines = match domain {
        Domain::Technical => vec![
            format!("{} compiles a syntax error, dealing {} confusion damage!", name, damage),
            format!("A recursive loop of logic crashes into you for {} processing damage!", damage),
            format!("{} executes a debugging nightmare for {} mental strain!", name, damage),
        ],
        Domain::Personal => vec![
            format!("{} projects painful memories, dealing {} emotional damage!", name, damage),
            format!("Waves of nostalgia overwhelm you for {} sentimental damage!", damage),
            format!("Forgotten regrets materialize, striking for {} psychological impact!", damage),
        ],
        Domain::Business => vec![
            format!("{} unleashes bureaucratic confusion for {} administrative damage!", name, damage),
            format!("A barrage of meeting jargon deals {} corporate fatigue!", damage),
            format!("Endless procedure protocols strike for {} organizational chaos!", damage),
        ],
        Domain::Errands => vec![
            format!("{} hurls shifting deadlines, dealing {} stress damage!", name, damage),
            format!("Scope creep materializes around you for {} requirement damage!", damage),
            format!("A cascade of dependencies crashes down for {} project disruption!", damage),
        ],
        other => {
            let realm = other.realm();
            vec![
                format!("{} channels the power of {} for {} knowledge damage!", name, realm, damage),
                format!("Mystical energy from {} strikes you for {} wisdom drain!", realm, damage),
                format!("The guardian's {} mastery deals {} understanding damage!", realm, damage),
            ]
        }
    };
    choose(lines, dice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::resolution::tests::{max_dice, LoadedDice};

    fn technical_enemy() -> Enemy {
        let mut enemy = Enemy::new("Stack Wraith", 30, 6, 40);
        enemy.domain = Some(Domain::Technical);
        enemy
    }

    #[test]
    fn test_plain_enemy_lines() {
        let enemy = Enemy::new("Goblin", 10, 3, 10);
        assert_eq!(player_attack(&enemy, 4, &mut max_dice()), "You strike for 4 damage!");
        assert_eq!(
            enemy_attack(&enemy, 2, 0.3, &mut max_dice()),
            "Goblin attacks you for 2 damage!"
        );
    }

    #[test]
    fn test_domain_lines_mention_damage() {
        let enemy = technical_enemy();
        let line = player_attack(&enemy, 7, &mut max_dice());
        assert!(line.contains("7"));
        assert!(line.contains("syntax"));

        let line = enemy_attack(&enemy, 3, 0.3, &mut max_dice());
        assert!(line.starts_with("Stack Wraith compiles"));
    }

    #[test]
    fn test_generic_domain_names_realm() {
        let mut enemy = technical_enemy();
        enemy.domain = Some(Domain::Culinary);
        let line = player_attack(&enemy, 5, &mut max_dice());
        assert!(line.contains("Culinary Arts"));
    }

    #[test]
    fn test_enemy_speaks_phrase() {
        let mut enemy = technical_enemy();
        enemy.combat_phrases = vec!["Segfault!".into(), "Null!".into()];
        let mut speaking = LoadedDice { high: true, chance: true };
        assert_eq!(
            enemy_attack(&enemy, 4, 0.3, &mut speaking),
            "Stack Wraith snarls: \"Segfault!\" - The attack deals 4 damage!"
        );
    }

    #[test]
    fn test_skill_line_mastery() {
        let enemy = technical_enemy();
        let mut player = Player::new("Vex", ClassArchetype::Mystic);
        assert!(player_skill(&enemy, &player, 12).contains("arcane"));
        player.skill_points = 40;
        assert!(player_skill(&enemy, &player, 12).ends_with("**ULTRA MASTERY!**"));
    }

    #[test]
    fn test_quiz_lines() {
        assert!(player_quiz(14).contains("14"));
        assert!(player_quiz(0).contains("fails"));
    }
}
