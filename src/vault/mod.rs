//! Vault module - note discovery, parsing and age classification

pub mod difficulty;
pub mod frontmatter;
pub mod note;
pub mod scanner;

pub use difficulty::{difficulty, AgeDescriptor};
pub use note::{Note, NoteRef};
pub use scanner::VaultScanner;
