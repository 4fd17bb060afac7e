//! Title and tag extraction from markdown text.
//!
//! Frontmatter is a small YAML subset between `---` fences; only `title` and
//! `tags` are read, so a line parser is enough.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s+(.+)$").expect("valid heading regex"));
static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)#([a-zA-Z][a-zA-Z0-9_/-]*)").expect("valid tag regex")
});

/// Fields read from a note's frontmatter block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub tags: Vec<String>,
}

/// Split content into (frontmatter_yaml, body). Empty frontmatter if none found.
pub fn split_frontmatter(content: &str) -> (&str, &str) {
    let trimmed = content.trim_start();
    let Some(after_open) = trimmed.strip_prefix("---") else {
        return ("", content);
    };

    match after_open.find("\n---") {
        Some(close_idx) => {
            let yaml = after_open[..close_idx].trim();
            let rest = &after_open[close_idx + 4..];
            // Drop the remainder of the closing fence line
            let body = match rest.find('\n') {
                Some(nl) => &rest[nl + 1..],
                None => "",
            };
            (yaml, body)
        }
        None => ("", content),
    }
}

pub fn parse_frontmatter(yaml: &str) -> Frontmatter {
    let mut fm = Frontmatter::default();

    for line in yaml.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = trimmed.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "title" => {
                    let title = unquote(value);
                    if !title.is_empty() {
                        fm.title = Some(title);
                    }
                }
                "tags" if value.starts_with('[') => fm.tags = parse_inline_list(value),
                _ => {}
            }
        }
    }

    fm
}

/// First markdown heading in the body, if any
pub fn first_heading(body: &str) -> Option<String> {
    HEADING_RE
        .captures(body)
        .map(|c| c[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn extract_inline_tags(body: &str) -> Vec<String> {
    INLINE_TAG_RE
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

/// Resolve a note title: heading, then frontmatter title, then the fallback
pub fn resolve_title(content: &str, fallback: &str) -> String {
    let (yaml, body) = split_frontmatter(content);
    first_heading(body)
        .or_else(|| parse_frontmatter(yaml).title)
        .unwrap_or_else(|| fallback.to_string())
}

/// Frontmatter tags plus inline tags, deduplicated case-insensitively
pub fn collect_tags(content: &str) -> BTreeSet<String> {
    let (yaml, body) = split_frontmatter(content);
    let mut seen = BTreeSet::new();
    let mut tags = BTreeSet::new();

    let candidates = parse_frontmatter(yaml)
        .tags
        .into_iter()
        .chain(extract_inline_tags(body));
    for tag in candidates {
        if seen.insert(tag.to_lowercase()) {
            tags.insert(tag);
        }
    }

    tags
}

fn unquote(s: &str) -> String {
    s.trim_matches('"').trim_matches('\'').to_string()
}

fn parse_inline_list(value: &str) -> Vec<String> {
    value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| unquote(s.trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WITH_FM: &str = "---\ntitle: \"Garden Plans\"\ntags: [home, Spring]\n---\nSome text #spring and #compost\n";

    #[test]
    fn test_split_frontmatter() {
        let (yaml, body) = split_frontmatter(WITH_FM);
        assert!(yaml.starts_with("title:"));
        assert_eq!(body, "Some text #spring and #compost\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let (yaml, body) = split_frontmatter("plain body");
        assert_eq!(yaml, "");
        assert_eq!(body, "plain body");
    }

    #[test]
    fn test_heading_beats_frontmatter_title() {
        let content = "---\ntitle: Meta\n---\n# Real Title\nbody";
        assert_eq!(resolve_title(content, "stem"), "Real Title");
    }

    #[test]
    fn test_frontmatter_title_then_stem() {
        assert_eq!(resolve_title(WITH_FM, "stem"), "Garden Plans");
        assert_eq!(resolve_title("no heading here", "stem"), "stem");
    }

    #[test]
    fn test_tags_deduplicated_case_insensitively() {
        let tags = collect_tags(WITH_FM);
        let lowered: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        assert_eq!(tags.len(), 3);
        assert!(lowered.contains(&"spring".to_string()));
        assert!(lowered.contains(&"home".to_string()));
        assert!(lowered.contains(&"compost".to_string()));
    }

    #[test]
    fn test_headings_are_not_tags() {
        let tags = extract_inline_tags("# Heading\n## Sub\ntext #real");
        assert_eq!(tags, vec!["real".to_string()]);
    }
}
