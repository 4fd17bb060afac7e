//! Structured details pulled from note text
//!
//! These are spliced verbatim into generated lore so an enemy reads as
//! born from *this* note rather than a generic one.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::vault::note::truncate_chars;

const MAX_HEADERS: usize = 5;
const MAX_LIST_ITEMS: usize = 8;
const MAX_NUMBERS: usize = 8;
const MAX_CODE_BLOCKS: usize = 2;
const MAX_BOLD: usize = 5;
const CODE_BLOCK_CHARS: usize = 100;
/// A line must be longer than this to count as the note's first line
const FIRST_LINE_MIN_CHARS: usize = 10;

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+(.+)$").expect("valid bullet regex"));
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*(.+)$").expect("valid numbered regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"));
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\b").expect("valid number regex"));
static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\w*\n([^`]+)\n```").expect("valid code block regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDetails {
    pub first_line: Option<String>,
    pub headers: Vec<String>,
    pub list_items: Vec<String>,
    /// Integers in (0, 10000)
    pub numbers: Vec<u32>,
    pub code_blocks: Vec<String>,
    pub bold: Vec<String>,
}

impl StructuredDetails {
    pub fn extract(content: &str) -> Self {
        let mut details = StructuredDetails::default();

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if details.first_line.is_none() && line.chars().count() > FIRST_LINE_MIN_CHARS {
                details.first_line = Some(line.trim_start_matches('#').trim().to_string());
            }

            if line.starts_with('#') {
                let header = line.trim_start_matches('#').trim();
                if !header.is_empty() && details.headers.len() < MAX_HEADERS {
                    details.headers.push(header.to_string());
                }
            } else if let Some(caps) = BULLET_RE
                .captures(line)
                .or_else(|| NUMBERED_RE.captures(line))
            {
                if details.list_items.len() < MAX_LIST_ITEMS {
                    details.list_items.push(caps[1].trim().to_string());
                }
            }

            for caps in BOLD_RE.captures_iter(line) {
                if details.bold.len() < MAX_BOLD {
                    details.bold.push(caps[1].trim().to_string());
                }
            }
        }

        details.numbers = NUMBER_RE
            .find_iter(content)
            .filter_map(|m| m.as_str().parse::<u32>().ok())
            .filter(|n| *n > 0 && *n < 10_000)
            .take(MAX_NUMBERS)
            .collect();

        details.code_blocks = CODE_BLOCK_RE
            .captures_iter(content)
            .take(MAX_CODE_BLOCKS)
            .map(|c| truncate_chars(c[1].trim(), CODE_BLOCK_CHARS))
            .collect();

        details
    }

    pub fn is_empty(&self) -> bool {
        self.first_line.is_none()
            && self.headers.is_empty()
            && self.list_items.is_empty()
            && self.numbers.is_empty()
            && self.code_blocks.is_empty()
            && self.bold.is_empty()
    }

    /// Compact summary lines for a generation prompt
    pub fn prompt_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.headers.is_empty() {
            lines.push(format!("Key sections: {}", self.headers.join(", ")));
        }
        if !self.list_items.is_empty() {
            lines.push(format!("Listed items: {}", self.list_items.join(", ")));
        }
        if !self.numbers.is_empty() {
            let nums: Vec<String> = self.numbers.iter().map(u32::to_string).collect();
            lines.push(format!("Important numbers: {}", nums.join(", ")));
        }
        if !self.bold.is_empty() {
            lines.push(format!("Emphasized: {}", self.bold.join(", ")));
        }
        if let Some(code) = self.code_blocks.first() {
            lines.push(format!("Code fragment: {}", code));
        }
        lines
    }
}
