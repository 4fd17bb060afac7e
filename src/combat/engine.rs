//! Turn-based encounter state machine
//!
//! `PlayerTurn -> Resolving* -> EnemyTurn -> PlayerTurn` until the encounter
//! settles in Victory, Defeat or Fled. Each action resolves against working
//! copies of the player and enemy; they are written back only when the whole
//! action succeeds, so a rejected action leaves nothing half-applied.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::combat::narrative;
use crate::combat::player::Player;
use crate::combat::resolution::{attack_damage, enemy_damage, quiz_damage, skill_damage, Dice};
use crate::combat::state::{CombatAction, CombatError, CombatPhase, CombatResult, Rewards};
use crate::core::types::EncounterId;
use crate::forge::enemy::Enemy;
use crate::quiz::QuizQuestion;

pub struct CombatEngine<D: Dice = ChaCha8Rng> {
    id: EncounterId,
    enemy: Enemy,
    phase: CombatPhase,
    dice: D,
    phrase_chance: f64,
    quiz_available: bool,
    prepared_quiz: Option<QuizQuestion>,
    rounds: u32,
}

impl CombatEngine<ChaCha8Rng> {
    pub fn new(enemy: Enemy, seed: u64) -> Self {
        Self::with_dice(enemy, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<D: Dice> CombatEngine<D> {
    pub fn with_dice(enemy: Enemy, dice: D) -> Self {
        let id = EncounterId::new();
        debug!("Encounter {} begins against {}", id, enemy.name);
        Self {
            id,
            enemy,
            phase: CombatPhase::PlayerTurn,
            dice,
            phrase_chance: 0.3,
            quiz_available: true,
            prepared_quiz: None,
            rounds: 0,
        }
    }

    /// Chance the enemy speaks a combat phrase when it strikes
    pub fn with_phrase_chance(mut self, chance: f64) -> Self {
        self.phrase_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn id(&self) -> EncounterId {
        self.id
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// The one quiz attack of this encounter is still unused
    pub fn quiz_available(&self) -> bool {
        self.quiz_available
    }

    pub fn prepared_quiz(&self) -> Option<&QuizQuestion> {
        self.prepared_quiz.as_ref()
    }

    /// Stage the question the next quiz action answers
    pub fn prepare_quiz(&mut self, question: QuizQuestion) -> Result<&QuizQuestion, CombatError> {
        if self.is_over() {
            return Err(CombatError::EncounterOver);
        }
        if !self.quiz_available {
            return Err(CombatError::QuizUnavailable);
        }
        Ok(self.prepared_quiz.insert(question))
    }

    /// End the encounter without rewards or penalties
    pub fn abandon(&mut self) {
        if !self.is_over() {
            debug!("Encounter {} abandoned", self.id);
            self.phase = CombatPhase::Fled;
        }
    }

    /// Resolve one player action and, if the enemy survives, its reply.
    ///
    /// On error neither `player` nor the encounter changes.
    pub fn apply_action(
        &mut self,
        player: &mut Player,
        action: CombatAction,
    ) -> Result<CombatResult, CombatError> {
        match self.phase {
            CombatPhase::PlayerTurn => {}
            phase if phase.is_terminal() => return Err(CombatError::EncounterOver),
            phase => {
                return Err(CombatError::Internal(format!(
                    "action submitted during {:?}",
                    phase
                )))
            }
        }
        if !player.alive || player.hitpoints == 0 {
            return Err(CombatError::Internal(format!("{} cannot fight", player.name)));
        }

        let mut hero = player.clone();
        let mut foe = self.enemy.clone();
        let mut trail = vec![CombatPhase::PlayerTurn, action.resolving_phase()];
        let mut lines = Vec::new();
        let mut quiz_spent = false;

        let damage_dealt = match &action {
            CombatAction::Flee => {
                trail.push(CombatPhase::Fled);
                let result = CombatResult {
                    phase: CombatPhase::Fled,
                    trail,
                    message: "You flee back into the forest.".to_string(),
                    rewards: None,
                    damage_dealt: 0,
                    damage_taken: 0,
                };
                self.phase = CombatPhase::Fled;
                info!("{} fled from {}", player.name, self.enemy.name);
                return Ok(result);
            }
            CombatAction::Attack => {
                let damage = attack_damage(&hero, &mut self.dice);
                lines.push(narrative::player_attack(&foe, damage, &mut self.dice));
                damage
            }
            CombatAction::Skill => {
                if !hero.can_use_skill() {
                    return Err(CombatError::NoSkillUses);
                }
                hero.skill_uses_today += 1;
                let damage = skill_damage(&hero, &mut self.dice);
                lines.push(format!(
                    "{} ({} uses left)",
                    narrative::player_skill(&foe, &hero, damage),
                    hero.skill_uses_left()
                ));
                damage
            }
            CombatAction::Quiz { answer } => {
                if !self.quiz_available {
                    return Err(CombatError::QuizUnavailable);
                }
                let question = self.prepared_quiz.as_ref().ok_or(CombatError::NoQuizPrepared)?;
                let correct = question.check(answer);
                quiz_spent = true;
                let damage = quiz_damage(&hero, correct);
                lines.push(narrative::player_quiz(damage));
                if !correct {
                    lines.push(format!("The answer was: {}", question.answer));
                }
                damage
            }
        };

        foe.take_damage(damage_dealt);

        let (phase, rewards, damage_taken) = if !foe.is_alive() {
            trail.push(CombatPhase::Victory);
            lines.push(foe.defeat_message.clone());
            let rewards = Self::grant_victory(&mut hero, &foe);
            lines.push(format!(
                "You gain {} experience and {} gold!",
                rewards.experience, rewards.gold
            ));
            if rewards.level_up_ready {
                lines.push("You feel ready to reach a new level.".to_string());
            }
            (CombatPhase::Victory, Some(rewards), 0)
        } else {
            trail.push(CombatPhase::EnemyTurn);
            let damage = enemy_damage(foe.attack, &hero, &mut self.dice);
            lines.push(narrative::enemy_attack(
                &foe,
                damage,
                self.phrase_chance,
                &mut self.dice,
            ));
            hero.hitpoints = hero.hitpoints.saturating_sub(damage);

            if hero.hitpoints == 0 {
                trail.push(CombatPhase::Defeat);
                lines.push(foe.victory_message.clone());
                hero.alive = false;
                hero.gold = 0;
                lines.push("You have been slain. Your gold is lost.".to_string());
                (CombatPhase::Defeat, None, damage)
            } else {
                trail.push(CombatPhase::PlayerTurn);
                (CombatPhase::PlayerTurn, None, damage)
            }
        };

        // Commit
        *player = hero;
        self.enemy = foe;
        self.phase = phase;
        self.rounds += 1;
        if quiz_spent {
            self.quiz_available = false;
            self.prepared_quiz = None;
        }

        match phase {
            CombatPhase::Victory => info!("{} defeated {}", player.name, self.enemy.name),
            CombatPhase::Defeat => info!("{} was slain by {}", player.name, self.enemy.name),
            _ => {}
        }

        Ok(CombatResult {
            phase,
            trail,
            message: lines.join("\n"),
            rewards,
            damage_dealt,
            damage_taken,
        })
    }

    fn grant_victory(player: &mut Player, enemy: &Enemy) -> Rewards {
        player.experience = player.experience.saturating_add(enemy.exp_reward);
        player.gold = player.gold.saturating_add(enemy.gold_reward);
        player.forest_fights = player.forest_fights.saturating_sub(1);
        player.total_kills += 1;
        Rewards {
            experience: enemy.exp_reward,
            gold: enemy.gold_reward,
            level_up_ready: player.can_level_up(),
            level_gain: None,
        }
    }
}
