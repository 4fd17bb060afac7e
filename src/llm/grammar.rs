//! Lenient labeled-field grammar for generated text
//!
//! Completions are asked to answer in `KEY: value` form but rarely comply
//! exactly: labels arrive bolded, lowercased, inline on one line or with
//! values wrapped over several lines. The grammar accepts all of that and
//! returns `None` for anything it can't use. It never panics.

use std::sync::LazyLock;

use regex::Regex;

/// Longest quiz question accepted from a completion
const MAX_QUESTION_CHARS: usize = 300;
const MAX_ANSWER_CHARS: usize = 200;
/// Unlabeled prose shorter than this is not treated as a narrative
const MIN_PROSE_CHARS: usize = 40;

const QUIZ_LABELS: &[&str] = &["QUESTION", "ANSWER", "TYPE"];
const ENEMY_LABELS: &[&str] = &[
    "NAME",
    "DESCRIPTION",
    "WEAPON",
    "ARMOR",
    "BACKSTORY",
    "ENVIRONMENT",
    "ENCOUNTER_NARRATIVE",
    "NARRATIVE",
    "PHRASE",
    "DEFEAT",
    "VICTORY",
];

static QUIZ_GRAMMAR: LazyLock<FieldGrammar> = LazyLock::new(|| FieldGrammar::new(QUIZ_LABELS));
static ENEMY_GRAMMAR: LazyLock<FieldGrammar> = LazyLock::new(|| FieldGrammar::new(ENEMY_LABELS));

/// Recognizes a fixed set of labels anywhere in a completion
pub struct FieldGrammar {
    labels: &'static [&'static str],
    marker: Regex,
}

impl FieldGrammar {
    pub fn new(labels: &'static [&'static str]) -> Self {
        let alts = labels
            .iter()
            .map(|l| regex::escape(l).replace('_', "[ _]"))
            .collect::<Vec<_>>()
            .join("|");
        // Line-leading labels match in any case; inline ones must be uppercase
        let pattern = format!(
            r"(?m)^[ \t>*#-]*\*{{0,2}}(?i:({alts}))\*{{0,2}}[ \t]*:|\b({alts}):"
        );
        Self {
            labels,
            marker: Regex::new(&pattern).expect("label grammar is a valid regex"),
        }
    }

    /// Split `text` into labeled fields; `None` when no label is present
    pub fn parse(&self, text: &str) -> Option<LabeledFields> {
        let mut markers = Vec::new();
        for caps in self.marker.captures_iter(text) {
            let (Some(whole), Some(label)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2)))
            else {
                continue;
            };
            let key = label.as_str().to_uppercase().replace(' ', "_");
            if self.labels.contains(&key.as_str()) {
                markers.push((key, whole.start(), whole.end()));
            }
        }

        if markers.is_empty() {
            return None;
        }

        let mut entries = Vec::with_capacity(markers.len());
        for (i, (key, _, value_start)) in markers.iter().enumerate() {
            let value_end = markers.get(i + 1).map(|m| m.1).unwrap_or(text.len());
            let value = clean_value(&text[*value_start..value_end]);
            entries.push((key.clone(), value));
        }

        Some(LabeledFields { entries })
    }
}

/// Fields in the order they appeared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledFields {
    entries: Vec<(String, String)>,
}

impl LabeledFields {
    /// First non-empty value for `label`
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, v)| k == label && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Every non-empty value for `label`, in order
    pub fn all(&self, label: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, v)| k == label && !v.is_empty())
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collapse whitespace, drop markdown emphasis, quotes and echoed placeholders
fn clean_value(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed
        .trim_matches('*')
        .trim()
        .trim_matches('"')
        .trim();

    // "[your question here]" echoed back from the prompt
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        return String::new();
    }
    trimmed.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReply {
    pub question: String,
    pub answer: String,
    /// Raw TYPE value, lowercased
    pub kind: Option<String>,
}

impl QuizReply {
    pub fn parse(text: &str) -> Option<Self> {
        let fields = QUIZ_GRAMMAR.parse(text)?;
        let question = fields.get("QUESTION")?;
        let answer = fields.get("ANSWER")?;

        if question.chars().count() > MAX_QUESTION_CHARS
            || answer.chars().count() > MAX_ANSWER_CHARS
        {
            return None;
        }

        Some(Self {
            question: question.to_string(),
            answer: answer.trim_end_matches('.').to_string(),
            kind: fields.get("TYPE").map(|t| t.to_lowercase()),
        })
    }
}

/// Enemy lore from a completion; absent fields are filled by the forge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyReply {
    pub name: Option<String>,
    pub description: Option<String>,
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub backstory: Option<String>,
    pub environment: Option<String>,
    pub narrative: Option<String>,
    pub phrases: Vec<String>,
    pub defeat: Option<String>,
    pub victory: Option<String>,
}

impl EnemyReply {
    /// Labeled reply, or unlabeled prose taken as the encounter narrative
    pub fn parse(text: &str) -> Option<Self> {
        match ENEMY_GRAMMAR.parse(text) {
            Some(fields) => Self::from_fields(&fields),
            None => Self::from_prose(text),
        }
    }

    fn from_fields(fields: &LabeledFields) -> Option<Self> {
        let owned = |label: &str| fields.get(label).map(str::to_string);

        let mut reply = Self {
            name: owned("NAME"),
            description: owned("DESCRIPTION"),
            weapon: owned("WEAPON"),
            armor: owned("ARMOR"),
            backstory: owned("BACKSTORY"),
            environment: owned("ENVIRONMENT"),
            narrative: owned("NARRATIVE").or_else(|| owned("ENCOUNTER_NARRATIVE")),
            phrases: fields.all("PHRASE").into_iter().map(str::to_string).collect(),
            defeat: owned("DEFEAT"),
            victory: owned("VICTORY"),
        };

        if reply.name.is_none() && reply.narrative.is_none() {
            // A lone "Description:" block is the scene itself
            reply.narrative = Some(reply.description.take()?);
        }
        Some(reply)
    }

    fn from_prose(text: &str) -> Option<Self> {
        let narrative = clean_value(text);
        if narrative.chars().count() < MIN_PROSE_CHARS {
            return None;
        }
        Some(Self {
            narrative: Some(narrative),
            ..Default::default()
        })
    }
}
