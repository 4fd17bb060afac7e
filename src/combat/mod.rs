pub mod constants;
pub mod engine;
pub mod narrative;
pub mod player;
pub mod resolution;
pub mod state;

pub use engine::CombatEngine;
pub use player::{ClassArchetype, Player};
pub use resolution::Dice;
pub use state::{CombatAction, CombatError, CombatPhase, CombatResult, Rewards};
