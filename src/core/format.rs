//! Markdown formatting applied around the editor selection

use std::ops::Range;

/// Formatting actions offered by the toolbar and the command palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    Quote,
    InlineCode,
    Link,
    Image,
}

impl Format {
    pub const ALL: [Format; 13] = [
        Format::Bold,
        Format::Italic,
        Format::Underline,
        Format::Strikethrough,
        Format::Heading1,
        Format::Heading2,
        Format::Heading3,
        Format::BulletList,
        Format::NumberedList,
        Format::Quote,
        Format::InlineCode,
        Format::Link,
        Format::Image,
    ];

    /// Short button label
    pub fn label(self) -> &'static str {
        match self {
            Format::Bold => "B",
            Format::Italic => "I",
            Format::Underline => "U",
            Format::Strikethrough => "S",
            Format::Heading1 => "H1",
            Format::Heading2 => "H2",
            Format::Heading3 => "H3",
            Format::BulletList => "•",
            Format::NumberedList => "1.",
            Format::Quote => "❝",
            Format::InlineCode => "</>",
            Format::Link => "Link",
            Format::Image => "Img",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Format::Bold => "Bold",
            Format::Italic => "Italic",
            Format::Underline => "Underline",
            Format::Strikethrough => "Strikethrough",
            Format::Heading1 => "Heading 1",
            Format::Heading2 => "Heading 2",
            Format::Heading3 => "Heading 3",
            Format::BulletList => "Bullet List",
            Format::NumberedList => "Numbered List",
            Format::Quote => "Quote",
            Format::InlineCode => "Inline Code",
            Format::Link => "Link",
            Format::Image => "Image",
        }
    }

    /// Text placed before and after the selection, and the placeholder used
    /// when nothing is selected
    fn markers(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Format::Bold => ("**", "**", "bold text"),
            Format::Italic => ("_", "_", "italic text"),
            Format::Underline => ("__", "__", "underlined text"),
            Format::Strikethrough => ("~~", "~~", "strikethrough text"),
            Format::Heading1 => ("\n# ", "", "Heading 1"),
            Format::Heading2 => ("\n## ", "", "Heading 2"),
            Format::Heading3 => ("\n### ", "", "Heading 3"),
            Format::BulletList => ("\n- ", "", "List item"),
            Format::NumberedList => ("\n1. ", "", "List item"),
            Format::Quote => ("\n> ", "", "Quote"),
            Format::InlineCode => ("`", "`", "inline code"),
            Format::Link => ("[", "](url)", "link text"),
            Format::Image => ("![", "](image-url)", "alt text"),
        }
    }
}

/// Text after formatting, with the wrapped text selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEdit {
    pub text: String,
    /// Selection in characters
    pub selection: Range<usize>,
}

/// Wrap the character range `selection` of `text` in the markers of `format`.
///
/// An empty selection inserts the placeholder. Out-of-range positions are
/// clamped to the end of the text.
pub fn apply(text: &str, selection: Range<usize>, format: Format) -> FormatEdit {
    let (before, after, placeholder) = format.markers();

    let char_count = text.chars().count();
    let start = selection.start.min(selection.end).min(char_count);
    let end = selection.start.max(selection.end).min(char_count);

    let byte_at = |chars: usize| {
        text.char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    let (start_byte, end_byte) = (byte_at(start), byte_at(end));

    let selected = &text[start_byte..end_byte];
    let inner = if selected.is_empty() { placeholder } else { selected };

    let mut out = String::with_capacity(text.len() + before.len() + inner.len() + after.len());
    out.push_str(&text[..start_byte]);
    out.push_str(before);
    out.push_str(inner);
    out.push_str(after);
    out.push_str(&text[end_byte..]);

    let inner_start = start + before.chars().count();
    FormatEdit {
        text: out,
        selection: inner_start..inner_start + inner.chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_wraps_selection() {
        let edit = apply("make this loud", 5..9, Format::Bold);
        assert_eq!(edit.text, "make **this** loud");
        assert_eq!(edit.selection, 7..11);
    }

    #[test]
    fn test_empty_selection_inserts_selected_placeholder() {
        let edit = apply("see ", 4..4, Format::Link);
        assert_eq!(edit.text, "see [link text](url)");
        assert_eq!(&edit.text[5..14], "link text");
        assert_eq!(edit.selection, 5..14);
    }

    #[test]
    fn test_heading_starts_new_line() {
        let edit = apply("intro", 5..5, Format::Heading2);
        assert_eq!(edit.text, "intro\n## Heading 2");
    }

    #[test]
    fn test_positions_count_characters() {
        let edit = apply("café au lait", 5..7, Format::InlineCode);
        assert_eq!(edit.text, "café `au` lait");
        assert_eq!(edit.selection, 6..8);
    }

    #[test]
    fn test_reversed_and_out_of_range_selection_is_clamped() {
        let edit = apply("abc", 9..1, Format::Italic);
        assert_eq!(edit.text, "a_bc_");
        assert_eq!(edit.selection, 2..4);
    }
}
