//! Game session - one player's run through the forest
//!
//! Owns everything an encounter touches: the player, the vault scanner, the
//! generative client and the forge/quiz engines built on it. Every random
//! stream is derived from one master seed, so two sessions with the same seed
//! and vault play out identically.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::combat::{CombatAction, CombatEngine, CombatError, CombatPhase, CombatResult, Player};
use crate::core::config::GameConfig;
use crate::core::error::{Result, VaultError};
use crate::forge::{Enemy, EnemyForge};
use crate::llm::GenerativeClient;
use crate::quiz::{QuizEngine, QuizQuestion};
use crate::vault::difficulty::{MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::vault::VaultScanner;

/// Opaque repository of characters
pub trait CharacterStore: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<Player>>;
    fn save(&self, player: &Player) -> Result<()>;
    fn list_all(&self) -> Result<Vec<Player>>;
}

/// Characters kept in memory, keyed by case-insensitive name
#[derive(Default)]
pub struct InMemoryCharacterStore {
    players: Mutex<BTreeMap<String, Player>>,
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

impl CharacterStore for InMemoryCharacterStore {
    fn load(&self, name: &str) -> Result<Option<Player>> {
        let players = self
            .players
            .lock()
            .map_err(|_| VaultError::Store("character store lock poisoned".into()))?;
        Ok(players.get(&Self::key(name)).cloned())
    }

    fn save(&self, player: &Player) -> Result<()> {
        if player.name.trim().is_empty() {
            return Err(VaultError::Store("character has no name".into()));
        }
        let mut players = self
            .players
            .lock()
            .map_err(|_| VaultError::Store("character store lock poisoned".into()))?;
        players.insert(Self::key(&player.name), player.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Player>> {
        let players = self
            .players
            .lock()
            .map_err(|_| VaultError::Store("character store lock poisoned".into()))?;
        Ok(players.values().cloned().collect())
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0} has fallen and must wait for a new day")]
    PlayerDead(String),

    #[error("No forest fights left today")]
    NoFightsLeft,

    #[error("An encounter is already in progress")]
    EncounterInProgress,

    #[error("No encounter in progress")]
    NoEncounter,

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Vault(#[from] VaultError),
}

pub struct GameSession {
    config: GameConfig,
    player: Player,
    scanner: VaultScanner,
    client: Arc<GenerativeClient>,
    forge: EnemyForge,
    quiz: QuizEngine,
    encounter: Option<CombatEngine>,
    /// Rolls made outside an encounter (level-up hitpoints)
    dice: ChaCha8Rng,
    seeds: ChaCha8Rng,
}

impl GameSession {
    /// Session with the backend chosen by the config (HTTP from env or none)
    pub fn from_config(config: GameConfig, player: Player) -> Self {
        let client = if config.generation.enabled {
            GenerativeClient::from_env(config.call_timeout())
        } else {
            GenerativeClient::disabled()
        };
        Self::new(config, player, Arc::new(client))
    }

    pub fn new(config: GameConfig, player: Player, client: Arc<GenerativeClient>) -> Self {
        let master = config.seed.unwrap_or_else(rand::random);
        let mut seeds = ChaCha8Rng::seed_from_u64(master);
        debug!("Session master seed {}", master);

        client.initialize();

        let mut scanner = VaultScanner::new(&config.vault);
        if scanner.root().is_none() {
            if let Some(found) = VaultScanner::discover() {
                scanner.set_root(found);
            }
        }

        let forge = EnemyForge::new(client.clone(), &config, seeds.next_u64());
        let quiz = QuizEngine::new(client.clone(), &config, seeds.next_u64());
        let dice = ChaCha8Rng::seed_from_u64(seeds.next_u64());

        Self {
            config,
            player,
            scanner,
            client,
            forge,
            quiz,
            encounter: None,
            dice,
            seeds,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn scanner(&self) -> &VaultScanner {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut VaultScanner {
        &mut self.scanner
    }

    pub fn client(&self) -> &Arc<GenerativeClient> {
        &self.client
    }

    pub fn forge(&self) -> &EnemyForge {
        &self.forge
    }

    pub fn quiz(&self) -> &QuizEngine {
        &self.quiz
    }

    pub fn encounter(&self) -> Option<&CombatEngine> {
        self.encounter.as_ref()
    }

    /// Rescan the vault if stale (or always with `force`); returns the note count
    pub fn refresh_vault(&mut self, force: bool) -> usize {
        self.scanner.scan(force).len()
    }

    /// Forge an enemy at the player's level and open an encounter with it
    pub fn start_encounter(&mut self) -> std::result::Result<&Enemy, SessionError> {
        if self.encounter.as_ref().is_some_and(|e| !e.is_over()) {
            return Err(SessionError::EncounterInProgress);
        }
        if !self.player.alive {
            return Err(SessionError::PlayerDead(self.player.name.clone()));
        }
        if self.player.forest_fights == 0 {
            return Err(SessionError::NoFightsLeft);
        }

        let level = self.player.level;
        let notes = self.scanner.scan(false);
        let enemy = self.forge.generate_for_level(notes, level);
        info!("{} encounters {} (level {})", self.player.name, enemy.name, level);

        let engine = CombatEngine::new(enemy, self.seeds.next_u64())
            .with_phrase_chance(self.config.combat.phrase_chance);
        Ok(self.encounter.insert(engine).enemy())
    }

    /// Generate and stage a question about the current enemy's note
    pub fn begin_quiz(&mut self) -> std::result::Result<&QuizQuestion, SessionError> {
        let engine = self.encounter.as_mut().ok_or(SessionError::NoEncounter)?;
        if engine.is_over() {
            return Err(CombatError::EncounterOver.into());
        }
        if !engine.quiz_available() {
            return Err(CombatError::QuizUnavailable.into());
        }
        if engine.prepared_quiz().is_none() {
            let source = engine
                .enemy()
                .source
                .clone()
                .ok_or(CombatError::QuizUnavailable)?;
            let difficulty = engine
                .enemy()
                .source_difficulty
                .unwrap_or(MIN_DIFFICULTY)
                .clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
            let question = self.quiz.generate(&source, difficulty);
            engine.prepare_quiz(question)?;
        }
        engine
            .prepared_quiz()
            .ok_or_else(|| CombatError::NoQuizPrepared.into())
    }

    /// Resolve one action. A victory that banks enough experience levels
    /// the player up before returning.
    pub fn apply_action(&mut self, action: CombatAction) -> std::result::Result<CombatResult, SessionError> {
        let engine = self.encounter.as_mut().ok_or(SessionError::NoEncounter)?;
        let mut result = engine.apply_action(&mut self.player, action)?;

        if result.phase == CombatPhase::Victory {
            if let Some(rewards) = result.rewards.as_mut() {
                if let Some(gain) = self.level_up() {
                    rewards.level_gain = Some(gain);
                    result.message.push_str(&format!(
                        "\nYou reach level {}! Max HP +{}.",
                        self.player.level, gain
                    ));
                }
            }
        }
        Ok(result)
    }

    /// Apply one pending level-up, returning the max hitpoints gained
    pub fn level_up(&mut self) -> Option<u32> {
        let gain = self.player.level_up(&mut self.dice)?;
        info!("{} reached level {} (+{} max HP)", self.player.name, self.player.level, gain);
        Some(gain)
    }

    /// Close the current encounter (abandoning it if unfinished) and save
    /// the player. Returns the phase the encounter ended in.
    pub fn finish_encounter(
        &mut self,
        store: &dyn CharacterStore,
    ) -> std::result::Result<CombatPhase, SessionError> {
        let mut engine = self.encounter.take().ok_or(SessionError::NoEncounter)?;
        engine.abandon();
        store.save(&self.player)?;
        debug!("Encounter {} closed as {:?}", engine.id(), engine.phase());
        Ok(engine.phase())
    }

    /// Start a new day for the player
    pub fn daily_reset(&mut self) {
        self.player.daily_reset();
    }

    /// Sweep expired cache entries; returns how many were dropped
    pub fn maintenance(&mut self) -> usize {
        let dropped = self.forge.sweep_expired() + self.quiz.sweep_expired();
        if dropped > 0 {
            debug!("Maintenance dropped {} cache entries", dropped);
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ClassArchetype;

    fn offline_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.seed = Some(11);
        config.generation.enabled = false;
        config.vault.root = Some(std::env::temp_dir().join("vault-legend-no-such-vault"));
        config
    }

    fn session() -> GameSession {
        GameSession::from_config(offline_config(), Player::new("Rook", ClassArchetype::Thief))
    }

    #[test]
    fn test_store_roundtrip() {
        let store = InMemoryCharacterStore::new();
        let player = Player::new("Rook", ClassArchetype::Thief);
        store.save(&player).unwrap();

        assert_eq!(store.load("ROOK").unwrap(), Some(player));
        assert_eq!(store.load("nobody").unwrap(), None);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_level_up_needs_banked_experience() {
        let mut session = session();
        assert_eq!(session.level_up(), None);

        session.player_mut().experience = crate::combat::constants::LEVEL_EXP[1];
        let gain = session.level_up().unwrap();
        assert_eq!(session.player().level, 2);
        assert_eq!(session.player().max_hitpoints, 20 + gain);
        assert_eq!(session.level_up(), None);
    }

    #[test]
    fn test_store_rejects_unnamed() {
        let store = InMemoryCharacterStore::new();
        let player = Player::new("  ", ClassArchetype::Thief);
        assert!(matches!(store.save(&player), Err(VaultError::Store(_))));
    }

    #[test]
    fn test_empty_vault_still_spawns_enemy() {
        let mut session = session();
        assert_eq!(session.refresh_vault(true), 0);

        let enemy = session.start_encounter().unwrap();
        assert!(enemy.source.is_none());
        assert!(matches!(
            session.start_encounter(),
            Err(SessionError::EncounterInProgress)
        ));
    }

    #[test]
    fn test_quiz_needs_source_note() {
        let mut session = session();
        session.start_encounter().unwrap();
        assert!(matches!(
            session.begin_quiz(),
            Err(SessionError::Combat(CombatError::QuizUnavailable))
        ));
    }

    #[test]
    fn test_finish_saves_player() {
        let mut session = session();
        let store = InMemoryCharacterStore::new();
        assert!(matches!(
            session.finish_encounter(&store),
            Err(SessionError::NoEncounter)
        ));

        session.start_encounter().unwrap();
        let phase = session.finish_encounter(&store).unwrap();
        assert_eq!(phase, CombatPhase::Fled);
        assert!(session.encounter().is_none());
        assert!(store.load("rook").unwrap().is_some());
    }

    #[test]
    fn test_dead_player_cannot_start() {
        let mut session = session();
        session.player_mut().alive = false;
        assert!(matches!(
            session.start_encounter(),
            Err(SessionError::PlayerDead(_))
        ));

        session.daily_reset();
        assert!(session.start_encounter().is_ok());
    }

    #[test]
    fn test_no_fights_left() {
        let mut session = session();
        session.player_mut().forest_fights = 0;
        assert!(matches!(
            session.start_encounter(),
            Err(SessionError::NoFightsLeft)
        ));
    }
}
