//! Prompt builders for enemy lore and quiz questions

use crate::analysis::Features;
use crate::vault::difficulty::AgeDescriptor;
use crate::vault::note::truncate_chars;

/// Note content sent with a quiz prompt
pub const QUIZ_CONTENT_CHARS: usize = 500;

/// Inputs for an enemy lore prompt
pub struct EnemyPrompt<'a> {
    pub title: &'a str,
    /// Sampled window of the note's content
    pub excerpt: &'a str,
    pub base_enemy: &'a str,
    pub level: u32,
    pub age: AgeDescriptor,
    pub features: &'a Features,
}

impl EnemyPrompt<'_> {
    pub fn render(&self) -> String {
        let mut context = self.excerpt.to_string();
        for line in self.features.details.prompt_lines() {
            context.push('\n');
            context.push_str(&line);
        }

        format!(
            r#"You are a dungeon master describing a magical encounter. The knowledge in this note has come alive as a level {level} {base} of the {realm}, {age} and {demeanor}.

Title: "{title}"
Content: {context}

Reply using exactly these labels, one per line:
NAME: [creature name, at most 6 words]
WEAPON: [weapon name]
ARMOR: [armor name]
BACKSTORY: [one sentence]
ENVIRONMENT: [short place name]
NARRATIVE: [3-4 sentences as a dungeon master would narrate the encounter, using concrete details from the note such as numbers, names and concepts]
PHRASE: [a taunt the creature shouts in combat]
PHRASE: [another taunt]
DEFEAT: [the creature's last words]
VICTORY: [what it says if it wins]"#,
            level = self.level,
            base = self.base_enemy,
            realm = self.features.domain.realm(),
            age = self.age.adjective().to_lowercase(),
            demeanor = self.features.archetype.demeanor(),
            title = self.title,
            context = context,
        )
    }
}

pub fn quiz_prompt(title: &str, content: &str) -> String {
    format!(
        r#"Based on this note about "{title}":

{content}

Generate a quiz question that tests understanding of the key concept.

Format your response exactly as:
QUESTION: [your question here]
ANSWER: [short answer]
TYPE: [definition/concept/relationship/fact]

Make it challenging but fair."#,
        title = title,
        content = truncate_chars(content, QUIZ_CONTENT_CHARS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ContentAnalyzer;
    use crate::vault::NoteRef;

    #[test]
    fn test_enemy_prompt_carries_details() {
        let note = NoteRef::new("Sourdough", "# Starter\nFeed the starter 50 grams of flour.\n- rye\n");
        let features = ContentAnalyzer::new().analyze(&note);
        let prompt = EnemyPrompt {
            title: &note.title,
            excerpt: &note.content,
            base_enemy: "Wild Boar",
            level: 1,
            age: AgeDescriptor::Fresh,
            features: &features,
        }
        .render();

        assert!(prompt.contains("Title: \"Sourdough\""));
        assert!(prompt.contains("Culinary Arts"));
        assert!(prompt.contains("Important numbers: 50"));
        assert!(prompt.contains("NARRATIVE:"));
    }

    #[test]
    fn test_quiz_prompt_truncates_content() {
        let content = "a".repeat(2000);
        let prompt = quiz_prompt("Long", &content);
        assert!(prompt.contains(&"a".repeat(QUIZ_CONTENT_CHARS)));
        assert!(!prompt.contains(&"a".repeat(QUIZ_CONTENT_CHARS + 1)));
        assert!(prompt.contains("QUESTION: [your question here]"));
    }
}
