//! Generative text integration
//!
//! Everything here degrades to `None`: callers always have a deterministic
//! path to fall back on.

pub mod backend;
pub mod client;
pub mod grammar;
pub mod prompt;

pub use backend::{CompletionRequest, GenerationKind, GenerativeBackend, HttpBackend, ScriptedBackend};
pub use client::{GenerativeClient, InitStatus};
pub use grammar::{EnemyReply, QuizReply};
