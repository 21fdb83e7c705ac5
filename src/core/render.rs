//! Markdown to HTML rendering for export

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use super::config::ExportConfig;
use super::theme::PreviewTheme;

/// Parser options selected by the export flags
pub fn parser_options(flags: &ExportConfig) -> Options {
    let mut options = Options::empty();
    if flags.gfm {
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
    }
    if flags.math {
        options.insert(Options::ENABLE_MATH);
    }
    if flags.heading_attributes {
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    }
    if flags.smart_punctuation {
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
    }
    options
}

/// Render `markdown` to an HTML fragment.
///
/// Raw HTML in the source is escaped. Image destinations are passed through
/// `resolve_image`; `None` keeps the original destination.
pub fn to_html<F>(markdown: &str, flags: &ExportConfig, resolve_image: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let parser = Parser::new_ext(markdown, parser_options(flags)).map(|event| match event {
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = resolve_image(&dest_url)
                .map(CowStr::from)
                .unwrap_or(dest_url);
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        Event::SoftBreak if flags.breaks => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Wrap a rendered fragment in a standalone HTML page styled by `theme`
pub fn html_document(title: &str, body: &str, theme: &PreviewTheme) -> String {
    let escaped_title = title
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let css = theme.css();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{escaped_title}</title>\n<style>\n{css}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}
