//! Presentation helpers shared by the chat log and comparison panel.
//!
//! Text from users and from the backend ends up in terminal cells. The only
//! "markup" a terminal understands is control characters (escape sequences),
//! so escaping here means making those inert and visible.

use std::sync::OnceLock;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use regex::Regex;

const CONTROL_PICTURES: u32 = 0x2400;
const DELETE_PICTURE: char = '\u{2421}';
/// Prefix marking the next character as literal text, not an escaped
/// control. Plays the role `&` plays in HTML entities.
const LITERAL_MARKER: char = '\u{2426}';

fn bold_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

fn is_escaped_control(c: char) -> bool {
    (c.is_ascii_control() && c != '\n' && c != '\t') || c == '\u{7f}'
}

fn control_picture(c: char) -> Option<char> {
    if c == '\u{7f}' {
        Some(DELETE_PICTURE)
    } else if is_escaped_control(c) {
        char::from_u32(CONTROL_PICTURES + c as u32)
    } else {
        None
    }
}

fn control_for_picture(c: char) -> Option<char> {
    if c == DELETE_PICTURE {
        return Some('\u{7f}');
    }
    let code = (c as u32).checked_sub(CONTROL_PICTURES)?;
    char::from_u32(code).filter(|original| *original != '\u{7f}' && is_escaped_control(*original))
}

/// Replace control characters (other than newline and tab) with their Unicode
/// control pictures so they are displayed instead of interpreted.
///
/// Pictures already present in `text`, and the literal marker itself, are
/// prefixed with the marker so `unescape_text` restores every input exactly.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some(picture) = control_picture(c) {
            escaped.push(picture);
        } else if c == LITERAL_MARKER || control_for_picture(c).is_some() {
            escaped.push(LITERAL_MARKER);
            escaped.push(c);
        } else {
            escaped.push(c);
        }
    }
    escaped
}

pub fn unescape_text(text: &str) -> String {
    let mut original = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == LITERAL_MARKER {
            // A trailing marker has nothing to protect and stays as is
            original.push(chars.next().unwrap_or(LITERAL_MARKER));
        } else {
            original.push(control_for_picture(c).unwrap_or(c));
        }
    }
    original
}

/// Markdown-lite formatting for assistant answers.
///
/// Newlines become line breaks and `**X**` becomes bold. Bold matching is
/// leftmost and non-greedy and runs over the whole answer, so a bold span may
/// continue across a line break. An unmatched `**` stays literal.
pub fn format_response(text: &str) -> Text<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    // (segment, is_bold) in source order
    let mut segments: Vec<(&str, bool)> = Vec::new();
    let mut last = 0;
    for caps in bold_pattern().captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push((&text[last..whole.start()], false));
        }
        segments.push((inner.as_str(), true));
        last = whole.end();
    }
    if last < text.len() {
        segments.push((&text[last..], false));
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for (segment, is_bold) in segments {
        for (i, piece) in segment.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            if piece.is_empty() {
                continue;
            }
            if is_bold {
                current.push(Span::styled(piece.to_string(), bold));
            } else {
                current.push(Span::raw(piece.to_string()));
            }
        }
    }
    lines.push(Line::from(current));

    Text::from(lines)
}

/// Number of terminal rows `lines` occupy when word-wrapped at `width`
/// columns, counted by the same wrapper the chat view renders with.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let rows = Paragraph::new(Text::from(lines.to_vec()))
        .wrap(Wrap { trim: false })
        .line_count(width.max(1));
    rows.min(u16::MAX as usize) as u16
}

/// Scroll offset that shows the last row of `content_height` rows in a
/// viewport of `viewport_height` rows.
pub fn scroll_to_bottom(content_height: u16, viewport_height: u16) -> u16 {
    content_height.saturating_sub(viewport_height)
}
