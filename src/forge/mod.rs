//! Enemy forge - turning notes into enemies
//!
//! A forged enemy starts from a bestiary template, is scaled by how stale
//! its note is relative to the encounter level, and gains bonuses from the
//! content analyzer. Lore comes from the generative backend when it answers
//! in time, otherwise from deterministic tables. Results are cached per
//! (note, level).

pub mod bestiary;
pub mod enemy;
pub mod lore;

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::analysis::{ContentAnalyzer, Features};
use crate::cache::{CacheKey, CacheStats, Operation, ResponseCache};
use crate::core::config::GameConfig;
use crate::llm::prompt::EnemyPrompt;
use crate::llm::{EnemyReply, GenerationKind, GenerativeClient};
use crate::vault::difficulty::AgeDescriptor;
use crate::vault::Note;

pub use bestiary::{templates_for_level, EnemyTemplate};
pub use enemy::{clamp_stats, Enemy};
pub use lore::{fallback_lore, fit_to_band, Lore, LoreContext};

/// Difficulty multiplier bounds
pub const MIN_MULTIPLIER: f64 = 0.8;
pub const MAX_MULTIPLIER: f64 = 1.5;

/// `note_difficulty / level`, clamped
pub fn difficulty_multiplier(note_difficulty: u8, level: u32) -> f64 {
    (note_difficulty as f64 / level.max(1) as f64).clamp(MIN_MULTIPLIER, MAX_MULTIPLIER)
}

/// Scale a template by the multiplier, add analyzer bonuses, clamp.
/// Returns (hitpoints, attack, gold).
pub fn forge_stats(template: &EnemyTemplate, multiplier: f64, features: &Features) -> (u32, u32, u32) {
    let bonus = features.total_bonus();
    let hp = (template.hitpoints as f64 * multiplier).round() as u32 + bonus.hp;
    let attack = (template.attack as f64 * multiplier).round() as u32 + bonus.attack;
    let gold = (template.gold as f64 * multiplier).round() as u32;
    let (hp, attack) = clamp_stats(hp, attack);
    (hp, attack, gold)
}

/// Take a bounded window of `content` for a prompt.
///
/// Long notes get a random starting offset, snapped forward to the next
/// sentence start; the window end is pulled back to the last sentence end
/// when one falls in its second half.
pub fn sample_window<R: Rng>(content: &str, window: usize, rng: &mut R) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= window {
        return content.trim().to_string();
    }

    let mut start = rng.gen_range(0..=chars.len() - window);
    if start > 0 {
        let lookahead = (start + window / 3).min(chars.len());
        if let Some(offset) = chars[start..lookahead]
            .iter()
            .position(|c| matches!(c, '.' | '!' | '?' | '\n'))
        {
            start += offset + 1;
        }
    }

    let end = (start + window).min(chars.len());
    let mut slice = &chars[start..end];
    if let Some(last) = slice
        .iter()
        .rposition(|c| matches!(c, '.' | '!' | '?' | '\n'))
    {
        if last >= window / 2 {
            slice = &slice[..=last];
        }
    }

    slice.iter().collect::<String>().trim().to_string()
}

pub struct EnemyForge {
    client: Arc<GenerativeClient>,
    cache: ResponseCache<Enemy>,
    analyzer: ContentAnalyzer,
    rng: ChaCha8Rng,
    availability_wait: Duration,
    window_chars: usize,
    max_tokens: u32,
}

impl EnemyForge {
    pub fn new(client: Arc<GenerativeClient>, config: &GameConfig, seed: u64) -> Self {
        Self {
            client,
            cache: ResponseCache::new(config.enemy_ttl(), config.cache.soft_capacity),
            analyzer: ContentAnalyzer::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            availability_wait: config.enemy_wait(),
            window_chars: config.generation.sample_window_chars,
            max_tokens: config.generation.enemy_max_tokens,
        }
    }

    /// Forge an enemy for `note` at encounter `level`
    pub fn generate(&mut self, note: &Note, level: u32, template: &EnemyTemplate) -> Enemy {
        let level = level.max(1);
        let key = CacheKey::new(Operation::Enemy, note.title.clone(), level);
        if let Some(enemy) = self.cache.get(&key) {
            debug!("Reusing cached enemy for '{}'", note.title);
            return enemy;
        }

        let note_ref = note.to_ref();
        let features = self.analyzer.analyze(&note_ref);
        let tier = note.difficulty_level();
        let age = AgeDescriptor::from_difficulty(tier);
        let multiplier = difficulty_multiplier(tier, level);
        let (hitpoints, attack, gold) = forge_stats(template, multiplier, &features);

        let ctx = LoreContext {
            title: &note.title,
            features: &features,
            age,
        };
        let fallback = fallback_lore(&ctx, &mut self.rng);
        let (lore, ai_enriched) = match self.generated_lore(note, level, template, &features, age) {
            Some(reply) => (merge_reply(reply, fallback, &ctx), true),
            None => (fallback, false),
        };

        let enemy = Enemy {
            name: lore.name,
            hitpoints,
            max_hitpoints: hitpoints,
            attack,
            gold_reward: gold,
            exp_reward: gold / 2,
            level,
            domain: Some(features.domain),
            source: Some(note.snippet_ref()),
            source_difficulty: Some(tier),
            description: lore.description,
            backstory: lore.backstory,
            environment_description: lore.environment,
            encounter_narrative: lore.narrative,
            weapon: lore.weapon,
            armor: lore.armor,
            combat_phrases: lore.phrases,
            defeat_message: lore.defeat,
            victory_message: lore.victory,
            ai_enriched,
        };

        info!(
            "Forged '{}' from '{}' (level {}, hp {}, attack {}, ai {})",
            enemy.name, note.title, level, enemy.hitpoints, enemy.attack, ai_enriched
        );
        self.cache.insert(key, enemy.clone());
        enemy
    }

    /// Forge an enemy for a level from a random note and template.
    ///
    /// An empty vault yields a plain bestiary creature.
    pub fn generate_for_level(&mut self, notes: &[Note], level: u32) -> Enemy {
        let templates = templates_for_level(level);
        let template = templates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(bestiary::FALLBACK_TEMPLATE);

        match notes.choose(&mut self.rng) {
            Some(note) => self.generate(note, level, &template),
            None => plain_enemy(&template, level),
        }
    }

    fn generated_lore(
        &mut self,
        note: &Note,
        level: u32,
        template: &EnemyTemplate,
        features: &Features,
        age: AgeDescriptor,
    ) -> Option<EnemyReply> {
        if !self.client.is_available(self.availability_wait) {
            debug!("Generative backend unavailable, using fallback lore");
            return None;
        }

        let excerpt = sample_window(&note.content, self.window_chars, &mut self.rng);
        let prompt = EnemyPrompt {
            title: &note.title,
            excerpt: &excerpt,
            base_enemy: template.name,
            level,
            age,
            features,
        }
        .render();

        let text = self
            .client
            .generate(&prompt, self.max_tokens, GenerationKind::Enemy)?;
        let reply = EnemyReply::parse(&text);
        if reply.is_none() {
            debug!("Unparseable enemy reply ({} chars), using fallback", text.len());
        }
        reply
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn sweep_expired(&mut self) -> usize {
        self.cache.sweep_expired()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear(Some(Operation::Enemy));
    }
}

/// Generated fields win; anything missing comes from the fallback
fn merge_reply(reply: EnemyReply, fallback: Lore, ctx: &LoreContext<'_>) -> Lore {
    let narrative = reply
        .narrative
        .map(|n| fit_to_band(&n, &ctx.narrative_pads()))
        .unwrap_or(fallback.narrative);
    let phrases = if reply.phrases.is_empty() {
        fallback.phrases
    } else {
        reply.phrases
    };

    Lore {
        name: reply.name.unwrap_or(fallback.name),
        description: reply.description.unwrap_or(fallback.description),
        backstory: reply.backstory.unwrap_or(fallback.backstory),
        weapon: reply.weapon.unwrap_or(fallback.weapon),
        armor: reply.armor.unwrap_or(fallback.armor),
        environment: reply.environment.unwrap_or(fallback.environment),
        narrative,
        phrases,
        defeat: reply.defeat.unwrap_or(fallback.defeat),
        victory: reply.victory.unwrap_or(fallback.victory),
    }
}

/// A bestiary creature with no note behind it
pub fn plain_enemy(template: &EnemyTemplate, level: u32) -> Enemy {
    let (hitpoints, attack) = clamp_stats(template.hitpoints, template.attack);
    let mut enemy = Enemy::new(template.name, hitpoints, attack, template.gold);
    enemy.level = level.max(1);
    enemy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ContentAnalyzer, Domain};
    use crate::vault::NoteRef;

    #[test]
    fn test_multiplier_clamps() {
        assert_eq!(difficulty_multiplier(1, 12), MIN_MULTIPLIER);
        assert_eq!(difficulty_multiplier(12, 1), MAX_MULTIPLIER);
        assert!((difficulty_multiplier(6, 5) - 1.2).abs() < 1e-9);
        assert_eq!(difficulty_multiplier(3, 0), MAX_MULTIPLIER);
    }

    #[test]
    fn test_forge_stats_adds_bonuses() {
        let template = EnemyTemplate {
            name: "Raven",
            hitpoints: 25,
            attack: 12,
            gold: 100,
        };
        let features = ContentAnalyzer::new().analyze(&NoteRef::new("t", "plain words"));
        assert_eq!(features.domain, Domain::General);

        // 25 * 1.0 + 5, 12 * 1.0 + 3
        assert_eq!(forge_stats(&template, 1.0, &features), (30, 15, 100));
        // 25 * 0.8 + 5 = 25, 12 * 0.8 = 9.6 -> 10, + 3
        assert_eq!(forge_stats(&template, 0.8, &features), (25, 13, 80));
    }

    #[test]
    fn test_sample_window_short_content_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(sample_window("  short note ", 600, &mut rng), "short note");
    }

    #[test]
    fn test_sample_window_bounded() {
        let content = "One sentence here. ".repeat(200);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let window = sample_window(&content, 600, &mut rng);
            assert!(window.chars().count() <= 600);
            assert!(window.ends_with('.'));
            assert!(window.starts_with("One"));
        }
    }

    #[test]
    fn test_plain_enemy_is_clamped() {
        let dragon = templates_for_level(12)[0];
        let enemy = plain_enemy(&dragon, 12);
        assert_eq!(enemy.hitpoints, 120);
        assert_eq!(enemy.attack, 60);
        assert_eq!(enemy.exp_reward, dragon.gold / 2);
        assert!(enemy.domain.is_none());
    }
}
