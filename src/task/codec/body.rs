//! Markdown body parsing and rendering.

use crate::task::domain::{Sections, TaskDocument, is_fence, normalize_body, section_heading};
use tracing::warn;

/// Parses the markdown body into title, preamble, and sections.
///
/// Only H1 lines before the first section can become the title. Heading
/// markers inside fenced code blocks are treated as content.
pub(super) fn parse(body: &str) -> TaskDocument {
    let mut title: Option<String> = None;
    let mut preamble = String::new();
    let mut sections = Sections::new();
    let mut current: Option<(String, String)> = None;
    let mut in_fence = false;

    for line in body.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        }
        let heading = if in_fence { None } else { section_heading(line) };

        if let Some(text) = heading {
            if let Some((name, content)) = current.take() {
                sections.merge(name, &content);
            }
            if sections.contains(text) {
                warn!(heading = text, "repeated section heading merged into its first occurrence");
            }
            current = Some((text.to_owned(), String::new()));
            continue;
        }

        match current.as_mut() {
            Some((_, content)) => push_line(content, line),
            None => match (title.is_none() && !in_fence, title_text(line)) {
                (true, Some(text)) => title = Some(text.to_owned()),
                _ => push_line(&mut preamble, line),
            },
        }
    }
    if let Some((name, content)) = current {
        sections.merge(name, &content);
    }

    let normalized_preamble = normalize_body(&preamble);
    TaskDocument {
        title,
        preamble: (!normalized_preamble.is_empty()).then_some(normalized_preamble),
        sections,
    }
}

/// Renders a document back to markdown.
pub(super) fn render(document: &TaskDocument) -> String {
    let mut out = String::new();
    if let Some(title) = document.title.as_deref() {
        out.push_str("# ");
        out.push_str(title);
        out.push_str("\n\n");
    }
    if let Some(preamble) = document.preamble.as_deref().filter(|text| !text.is_empty()) {
        out.push_str(preamble);
        out.push_str("\n\n");
    }
    for section in &document.sections {
        out.push_str("## ");
        out.push_str(section.heading());
        out.push_str("\n\n");
        if !section.body().is_empty() {
            out.push_str(section.body());
            out.push_str("\n\n");
        }
    }
    out
}

/// Collapses runs of three or more newlines to two and ends the text with
/// exactly one newline.
pub(super) fn finish(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut newlines = 0_usize;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(ch);
            }
        } else {
            newlines = 0;
            out.push(ch);
        }
    }
    let trimmed_len = out.trim_end_matches('\n').len();
    out.truncate(trimmed_len);
    out.push('\n');
    out
}

fn title_text(line: &str) -> Option<&str> {
    line.strip_prefix("# ")
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn push_line(buffer: &mut String, line: &str) {
    buffer.push_str(line);
    buffer.push('\n');
}
