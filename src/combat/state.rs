//! Encounter phases, actions and results

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where an encounter stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatPhase {
    PlayerTurn,
    ResolvingAttack,
    ResolvingSkill,
    ResolvingQuiz,
    Fleeing,
    EnemyTurn,
    Victory,
    Defeat,
    Fled,
}

impl CombatPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CombatPhase::Victory | CombatPhase::Defeat | CombatPhase::Fled
        )
    }
}

/// What the player does on their turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatAction {
    Attack,
    Skill,
    Quiz { answer: String },
    Flee,
}

impl CombatAction {
    /// Phase entered while this action resolves
    pub fn resolving_phase(&self) -> CombatPhase {
        match self {
            CombatAction::Attack => CombatPhase::ResolvingAttack,
            CombatAction::Skill => CombatPhase::ResolvingSkill,
            CombatAction::Quiz { .. } => CombatPhase::ResolvingQuiz,
            CombatAction::Flee => CombatPhase::Fleeing,
        }
    }
}

/// Granted on victory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub experience: u32,
    pub gold: u32,
    /// Enough experience banked for the next level
    pub level_up_ready: bool,
    /// Max hitpoints gained when the level-up was applied
    #[serde(default)]
    pub level_gain: Option<u32>,
}

/// Outcome of one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    /// Phase after the action settled
    pub phase: CombatPhase,
    /// Every phase passed through, in order
    pub trail: Vec<CombatPhase>,
    pub message: String,
    pub rewards: Option<Rewards>,
    /// Damage the player dealt
    pub damage_dealt: u32,
    /// Damage the enemy dealt back
    pub damage_taken: u32,
}

/// Rejected action. Player and enemy are left exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("The encounter is already over")]
    EncounterOver,

    #[error("No skill uses left today")]
    NoSkillUses,

    #[error("The quiz attack was already used this encounter")]
    QuizUnavailable,

    #[error("No quiz question has been prepared")]
    NoQuizPrepared,

    #[error("Combat error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(CombatPhase::Victory.is_terminal());
        assert!(CombatPhase::Fled.is_terminal());
        assert!(!CombatPhase::EnemyTurn.is_terminal());
        assert!(!CombatPhase::PlayerTurn.is_terminal());
    }

    #[test]
    fn test_resolving_phase() {
        let quiz = CombatAction::Quiz { answer: "x".into() };
        assert_eq!(quiz.resolving_phase(), CombatPhase::ResolvingQuiz);
        assert_eq!(CombatAction::Flee.resolving_phase(), CombatPhase::Fleeing);
    }
}
