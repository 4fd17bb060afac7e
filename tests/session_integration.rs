//! Game session integration tests
//!
//! Sessions are self-contained: two sessions in the same process, each with
//! its own vault, client and seed, never see each other's state.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use vault_legend::combat::constants::{LEVEL_EXP, LEVEL_UP_HP_GAIN_MAX, LEVEL_UP_HP_GAIN_MIN};
use vault_legend::combat::{ClassArchetype, CombatAction, CombatPhase, Player};
use vault_legend::core::config::GameConfig;
use vault_legend::llm::{GenerativeClient, ScriptedBackend};
use vault_legend::session::{CharacterStore, GameSession, InMemoryCharacterStore};

struct TempVault(PathBuf);

impl TempVault {
    fn with_notes(notes: &[(&str, &str)]) -> Self {
        let dir = std::env::temp_dir().join(format!("vault-session-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in notes {
            fs::write(dir.join(name), content).unwrap();
        }
        Self(dir)
    }
}

impl Drop for TempVault {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn config_for(vault: &TempVault, seed: u64) -> GameConfig {
    let mut config = GameConfig::default();
    config.vault.root = Some(vault.0.clone());
    config.seed = Some(seed);
    config.generation.enemy_wait_ms = 200;
    config.generation.quiz_wait_ms = 200;
    config
}

fn offline_session(vault: &TempVault, seed: u64) -> GameSession {
    let client = Arc::new(GenerativeClient::disabled());
    let player = Player::new("Ilse", ClassArchetype::Mystic);
    GameSession::new(config_for(vault, seed), player, client)
}

#[test]
fn test_quiz_attack_against_note_enemy() {
    let vault = TempVault::with_notes(&[(
        "tea.md",
        "# Tea\nMatcha is a powdered green tea.\n",
    )]);
    let mut session = offline_session(&vault, 3);
    assert_eq!(session.refresh_vault(true), 1);

    let enemy = session.start_encounter().unwrap();
    assert_eq!(enemy.title(), Some("Tea"));

    let question = session.begin_quiz().unwrap().clone();
    assert_eq!(question.question, "What is matcha?");

    // Asking twice gives the same staged question
    assert_eq!(session.begin_quiz().unwrap(), &question);

    let attack = session.player().attack_power;
    let result = session
        .apply_action(CombatAction::Quiz { answer: "powdered green tea".into() })
        .unwrap();
    assert_eq!(result.damage_dealt, 2 * attack);
    assert!(session.begin_quiz().is_err());
}

#[test]
fn test_scripted_backend_enriches_encounter() {
    let vault = TempVault::with_notes(&[("plan.md", "# Plan\nShip the release on Friday.")]);
    let backend = Arc::new(ScriptedBackend::from_script(
        "NAME: Deadline Drake\nNARRATIVE: A drake made of calendar pages unfurls its wings over the release branch.\nPHRASE: Friday never comes!",
    ));
    let client = Arc::new(GenerativeClient::with_backend(
        backend.clone(),
        Duration::from_secs(2),
    ));
    let player = Player::new("Ilse", ClassArchetype::Thief);
    let mut session = GameSession::new(config_for(&vault, 8), player, client);

    let enemy = session.start_encounter().unwrap();
    assert_eq!(enemy.name, "Deadline Drake");
    assert!(enemy.ai_enriched);
    assert_eq!(enemy.combat_phrases, vec!["Friday never comes!".to_string()]);
    assert_eq!(backend.calls(), 1);
}

#[test]
fn test_fight_until_settled_then_save() {
    let vault = TempVault::with_notes(&[("a.md", "# A\nshort note")]);
    let mut session = offline_session(&vault, 5);
    session.player_mut().hitpoints = 500;
    session.player_mut().max_hitpoints = 500;
    let store = InMemoryCharacterStore::new();

    session.start_encounter().unwrap();
    let mut last = CombatPhase::PlayerTurn;
    for _ in 0..500 {
        let result = session.apply_action(CombatAction::Attack).unwrap();
        last = result.phase;
        if last.is_terminal() {
            break;
        }
    }
    assert!(last.is_terminal());

    let phase = session.finish_encounter(&store).unwrap();
    assert_eq!(phase, last);
    let saved = store.load("Ilse").unwrap().unwrap();
    assert_eq!(&saved, session.player());
    if phase == CombatPhase::Victory {
        assert_eq!(saved.forest_fights, 14);
        assert_eq!(saved.total_kills, 1);
    }
}

#[test]
fn test_same_seed_same_enemy() {
    let vault = TempVault::with_notes(&[
        ("one.md", "# One\nThe first note about budgets and invoices."),
        ("two.md", "# Two\nA second note about travel and flights."),
        ("three.md", "# Three\nA recipe for bread with flour and yeast."),
    ]);

    let mut a = offline_session(&vault, 99);
    let mut b = offline_session(&vault, 99);
    let first = a.start_encounter().unwrap().clone();
    let second = b.start_encounter().unwrap().clone();

    assert_eq!(first.name, second.name);
    assert_eq!(first.hitpoints, second.hitpoints);
    assert_eq!(first.title(), second.title());
}

#[test]
fn test_maintenance_keeps_fresh_entries() {
    let vault = TempVault::with_notes(&[("a.md", "# A\nnote")]);
    let mut session = offline_session(&vault, 1);
    session.start_encounter().unwrap();
    assert_eq!(session.maintenance(), 0);
    assert_eq!(session.forge().cache_stats().entries, 1);
}

#[test]
fn test_victories_level_the_player_up() {
    let vault = TempVault::with_notes(&[("a.md", "# A\nshort note")]);
    let mut session = offline_session(&vault, 21);
    {
        let player = session.player_mut();
        player.attack_power = 500;
        player.hitpoints = 5000;
        player.max_hitpoints = 5000;
    }
    let store = InMemoryCharacterStore::new();

    let mut gains = Vec::new();
    while session.player().can_fight() {
        session.start_encounter().unwrap();
        let mut result = session.apply_action(CombatAction::Attack).unwrap();
        while !result.phase.is_terminal() {
            result = session.apply_action(CombatAction::Attack).unwrap();
        }
        assert_eq!(result.phase, CombatPhase::Victory);

        if let Some(gain) = result.rewards.and_then(|r| r.level_gain) {
            assert!((LEVEL_UP_HP_GAIN_MIN..=LEVEL_UP_HP_GAIN_MAX).contains(&gain));
            assert!(result.message.contains("You reach level"));
            gains.push(gain);
        }
        session.finish_encounter(&store).unwrap();
    }

    let player = session.player();
    assert!(player.experience >= LEVEL_EXP[1]);
    assert!(!gains.is_empty());
    assert_eq!(player.level, 1 + gains.len() as u32);
    assert_eq!(player.max_hitpoints, 5000 + gains.iter().sum::<u32>());
    assert_eq!(store.load("Ilse").unwrap().unwrap().level, player.level);
}

#[test]
fn test_quiz_difficulty_follows_note_age() {
    let vault = TempVault::with_notes(&[(
        "tea.md",
        "# Tea\nMatcha is a powdered green tea.\n",
    )]);
    let mut session = offline_session(&vault, 3);
    session.player_mut().level = 5;

    let enemy = session.start_encounter().unwrap();
    assert_eq!(enemy.level, 5);
    // Written moments ago, so the freshest tier
    assert_eq!(enemy.source_difficulty, Some(1));

    let question = session.begin_quiz().unwrap();
    assert_eq!(question.difficulty, 1);
}
