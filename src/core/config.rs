//! Game configuration with documented defaults
//!
//! Every tunable number used by the vault scanner, caches, generative
//! client and combat lives here. A config is loaded from TOML; any section
//! or key left out falls back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VaultError};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub vault: VaultConfig,
    pub cache: CacheConfig,
    pub generation: GenerationConfig,
    pub combat: CombatConfig,
    /// Master seed for every random stream in a session.
    ///
    /// None = seed from entropy.
    pub seed: Option<u64>,
}

/// Note discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault root. None = auto-discover under the home directory.
    pub root: Option<PathBuf>,
    /// File extensions treated as notes (without the dot)
    pub extensions: Vec<String>,
    /// How long a scan result stays fresh before a rescan (seconds)
    pub freshness_secs: u64,
    /// Path fragments that exclude a file (case-insensitive)
    pub skip_patterns: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: None,
            extensions: vec!["md".into(), "markdown".into()],
            freshness_secs: 300,
            skip_patterns: vec!["template".into(), ".icloud".into()],
        }
    }
}

/// Response cache lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Forged enemies (seconds)
    pub enemy_ttl_secs: u64,
    /// Quiz questions (seconds)
    pub quiz_ttl_secs: u64,
    /// Warn when a cache grows beyond this many live entries
    pub soft_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enemy_ttl_secs: 600,
            quiz_ttl_secs: 1200,
            soft_capacity: 100,
        }
    }
}

/// Generative backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Disable the generative path entirely
    pub enabled: bool,
    /// Max wait on backend initialization before forging an enemy (ms)
    pub enemy_wait_ms: u64,
    /// Max wait on backend initialization before writing a quiz (ms)
    pub quiz_wait_ms: u64,
    /// Upper bound on a single completion call (ms)
    pub call_timeout_ms: u64,
    /// Characters of note content sent with an enemy prompt
    pub sample_window_chars: usize,
    pub enemy_max_tokens: u32,
    pub quiz_max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enemy_wait_ms: 2000,
            quiz_wait_ms: 1000,
            call_timeout_ms: 20_000,
            sample_window_chars: 600,
            enemy_max_tokens: 400,
            quiz_max_tokens: 100,
        }
    }
}

/// Daily limits for new characters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub daily_forest_fights: u32,
    pub daily_skill_uses: u32,
    /// Chance that an enemy speaks one of its combat phrases when it attacks
    pub phrase_chance: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            daily_forest_fights: 15,
            daily_skill_uses: 3,
            phrase_chance: 0.3,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.vault.extensions.is_empty() {
            return Err(VaultError::Config(
                "vault.extensions must name at least one extension".into(),
            ));
        }

        if self.cache.enemy_ttl_secs == 0 || self.cache.quiz_ttl_secs == 0 {
            return Err(VaultError::Config("cache TTLs must be positive".into()));
        }

        if self.generation.call_timeout_ms == 0 {
            return Err(VaultError::Config(
                "generation.call_timeout_ms must be positive".into(),
            ));
        }

        // Prompts below this size carry too little of the note to be useful
        if self.generation.sample_window_chars < 100 {
            return Err(VaultError::Config(format!(
                "generation.sample_window_chars ({}) should be >= 100",
                self.generation.sample_window_chars
            )));
        }

        if !(0.0..=1.0).contains(&self.combat.phrase_chance) {
            return Err(VaultError::Config(format!(
                "combat.phrase_chance ({}) must be within 0.0..=1.0",
                self.combat.phrase_chance
            )));
        }

        Ok(())
    }

    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.vault.freshness_secs)
    }

    pub fn enemy_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.enemy_ttl_secs)
    }

    pub fn quiz_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.quiz_ttl_secs)
    }

    pub fn enemy_wait(&self) -> Duration {
        Duration::from_millis(self.generation.enemy_wait_ms)
    }

    pub fn quiz_wait(&self) -> Duration {
        Duration::from_millis(self.generation.quiz_wait_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.generation.call_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            seed = 7

            [cache]
            enemy_ttl_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.cache.enemy_ttl_secs, 60);
        assert_eq!(config.cache.quiz_ttl_secs, 1200);
        assert_eq!(config.vault.freshness_secs, 300);
        assert_eq!(config.generation.enemy_wait_ms, 2000);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = GameConfig::from_toml_str("[cache]\nquiz_ttl_secs = 0\n");
        assert!(matches!(result, Err(VaultError::Config(_))));
    }

    #[test]
    fn test_bad_phrase_chance_rejected() {
        let mut config = GameConfig::default();
        config.combat.phrase_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let result = GameConfig::from_toml_str("[cache\n");
        assert!(matches!(result, Err(VaultError::Toml(_))));
    }
}
