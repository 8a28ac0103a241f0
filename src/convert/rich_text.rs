// src/convert/rich_text.rs
//! Inline Markdown rendering for styled text spans.

use crate::model::RichTextItem;

/// Renders one span to inline Markdown.
///
/// Marks nest in a fixed order so output is deterministic: code innermost,
/// then bold, italic, strikethrough, underline, and finally the link
/// wrapper around the whole styled run. Plain text is emitted verbatim;
/// Markdown metacharacters are not escaped.
pub fn render_span(span: &RichTextItem) -> String {
    let mut text = span.plain_text.clone();
    let marks = &span.annotations;

    if marks.code {
        text = format!("`{}`", text);
    }
    if marks.bold {
        text = format!("**{}**", text);
    }
    if marks.italic {
        text = format!("*{}*", text);
    }
    if marks.strikethrough {
        text = format!("~~{}~~", text);
    }
    if marks.underline {
        text = format!("<u>{}</u>", text);
    }

    if let Some(href) = &span.href {
        text = format!("[{}]({})", text, href);
    }

    text
}

/// Renders a sequence of spans and joins them with no separator.
pub fn render_spans(spans: &[RichTextItem]) -> String {
    spans.iter().map(render_span).collect()
}

/// Joins the raw text of spans, ignoring styling. Used where Markdown
/// marks would corrupt the output: code fences, image captions, table
/// cells.
pub fn plain_text(spans: &[RichTextItem]) -> String {
    spans.iter().map(|s| s.plain_text.as_str()).collect()
}
