//! Document statistics

use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};
use regex_lite::Regex;

/// Words read per minute when estimating reading time
pub const WORDS_PER_MINUTE: usize = 200;

/// Counts derived from a markdown text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub lines: usize,
    pub paragraphs: usize,
    pub reading_time_minutes: usize,
    pub headings: usize,
    pub images: usize,
    pub links: usize,
    pub code_blocks: usize,
}

impl DocumentStats {
    pub fn compute(markdown: &str) -> Self {
        let plain = markup_pattern().replace_all(markdown, "");
        let words = plain.split_whitespace().count();

        let paragraphs = paragraph_break_pattern()
            .split(markdown)
            .filter(|p| !p.trim().is_empty())
            .count();

        let mut stats = Self {
            words,
            characters: markdown.chars().count(),
            characters_no_spaces: markdown.chars().filter(|c| !c.is_whitespace()).count(),
            lines: markdown.split('\n').count(),
            paragraphs,
            reading_time_minutes: words.div_ceil(WORDS_PER_MINUTE),
            ..Self::default()
        };

        for event in Parser::new(markdown) {
            if let Event::Start(tag) = event {
                match tag {
                    Tag::Heading { .. } => stats.headings += 1,
                    Tag::Image { .. } => stats.images += 1,
                    Tag::Link { .. } => stats.links += 1,
                    Tag::CodeBlock(CodeBlockKind::Fenced(_)) => stats.code_blocks += 1,
                    _ => {}
                }
            }
        }

        stats
    }
}

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[#*`_~\[\]()]").expect("markup pattern is valid"))
}

fn paragraph_break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"))
}

/// Human-readable byte size, e.g. `1.5 KB`
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        let rounded = (value * 100.0).round() / 100.0;
        format!("{} {}", rounded, UNITS[unit])
    }
}
