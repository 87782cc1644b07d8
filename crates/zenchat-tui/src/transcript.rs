//! Turns conversation messages into styled terminal lines.
//!
//! Prose goes through a small inline markdown pass; code blocks are laid
//! out verbatim behind a gutter so indentation survives.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use zenchat_core::{ChatMessage, ChatRole, Conversation, Span as Segment, SpanKind};

const CODE_GUTTER: &str = "  │ ";

fn sender_style(role: ChatRole) -> Style {
    let color = match role {
        ChatRole::User => Color::Cyan,
        ChatRole::Assistant => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn code_style() -> Style {
    Style::default().fg(Color::LightGreen)
}

/// Parse a line of prose: **bold** and `inline code` become styled spans
pub fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();

                let mut bold_text = String::new();
                let mut found_close = false;
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'*') {
                        chars.next();
                        found_close = true;
                        break;
                    }
                    bold_text.push(c);
                }

                if found_close && !bold_text.is_empty() {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(std::mem::take(&mut current_text)));
                    }
                    spans.push(Span::styled(
                        bold_text,
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                } else {
                    // No closing **, treat as literal
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                    if found_close {
                        current_text.push_str("**");
                    }
                }
            }
            '`' => {
                let mut code_text = String::new();
                let mut found_close = false;
                for c in chars.by_ref() {
                    if c == '`' {
                        found_close = true;
                        break;
                    }
                    code_text.push(c);
                }

                if found_close && !code_text.is_empty() {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(std::mem::take(&mut current_text)));
                    }
                    spans.push(Span::styled(code_text, code_style()));
                } else {
                    current_text.push('`');
                    current_text.push_str(&code_text);
                    if found_close {
                        current_text.push('`');
                    }
                }
            }
            _ => current_text.push(c),
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn push_segment(lines: &mut Vec<Line<'static>>, segment: &Segment) {
    match segment.kind {
        SpanKind::Text => {
            for line in segment.content.lines() {
                lines.push(parse_markdown_line(line));
            }
        }
        SpanKind::Code => {
            let gutter = Style::default().fg(Color::DarkGray);
            for line in segment.content.lines() {
                lines.push(Line::from(vec![
                    Span::styled(CODE_GUTTER, gutter),
                    Span::styled(line.to_string(), code_style()),
                ]));
            }
        }
    }
}

/// Lines for one message: sender header, then each segment in order
pub fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("{}:", message.role.sender_name()),
        sender_style(message.role),
    ))];

    for segment in message.segments() {
        push_segment(&mut lines, &segment);
    }

    lines
}

/// Full chat transcript, with the thinking indicator appended while a
/// request is in flight
pub fn transcript_lines(
    conversation: &Conversation,
    loading: bool,
    animation_frame: u8,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for message in conversation.messages() {
        lines.extend(message_lines(message));
        lines.push(Line::default());
    }

    if loading {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize % 3) + 1);
        lines.push(Line::from(Span::styled(
            format!("{} is thinking{}", ChatRole::Assistant.sender_name(), dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Rows the lines occupy once word-wrapped to `width` columns, using the
/// same wrapping the chat view renders with
pub fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let rows = Paragraph::new(lines.to_vec())
        .wrap(Wrap { trim: false })
        .line_count(width.max(1));
    rows.min(u16::MAX as usize) as u16
}

/// Plain-text rendering for non-interactive output; code blocks sit
/// between rules
pub fn render_plain(segments: &[Segment]) -> String {
    let rule = "─".repeat(40);
    let mut out = String::new();

    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if segment.is_code() {
            out.push_str(&rule);
            out.push('\n');
            out.push_str(&segment.content);
            out.push('\n');
            out.push_str(&rule);
            out.push('\n');
        } else {
            out.push_str(&segment.content);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use zenchat_core::segment;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bold_is_styled() {
        let line = parse_markdown_line("a **b** c");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "b");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_unclosed_markers_are_literal() {
        assert_eq!(line_text(&parse_markdown_line("2 ** 3")), "2 ** 3");
        assert_eq!(line_text(&parse_markdown_line("a `b")), "a `b");
        assert_eq!(line_text(&parse_markdown_line("empty `` ticks")), "empty `` ticks");
    }

    #[test]
    fn test_inline_code_is_styled() {
        let line = parse_markdown_line("run `cargo test` now");
        assert_eq!(line_text(&line), "run cargo test now");
        assert_eq!(line.spans[1].style.fg, Some(Color::LightGreen));
    }

    #[test]
    fn test_message_lines_keep_code_verbatim() {
        let message = ChatMessage::assistant("Look:\n```rust\nfn main() {\n    **not bold**\n}\n```");
        let lines = message_lines(&message);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(
            texts,
            vec![
                "ZenAI:".to_string(),
                "Look:".to_string(),
                format!("{}fn main() {{", CODE_GUTTER),
                format!("{}    **not bold**", CODE_GUTTER),
                format!("{}}}", CODE_GUTTER),
            ]
        );
    }

    #[test]
    fn test_user_header() {
        let lines = message_lines(&ChatMessage::user("hi"));
        assert_eq!(line_text(&lines[0]), "You:");
        assert_eq!(line_text(&lines[1]), "hi");
    }

    #[test]
    fn test_transcript_thinking_indicator() {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::user("hello"));

        let idle = transcript_lines(&conversation, false, 0);
        assert_eq!(idle.len(), 3);

        let busy = transcript_lines(&conversation, true, 2);
        assert_eq!(line_text(busy.last().unwrap()), "ZenAI is thinking...");
    }

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("abcdefghij"), Line::default(), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 10), 3);
        assert_eq!(wrapped_height(&lines, 0), 10 + 1 + 3);
    }

    #[test]
    fn test_wrapped_height_breaks_at_words() {
        // Character-position wrapping would need 2 rows; word wrapping needs 3
        let lines = vec![Line::from("aaaaaa bbbbbb cccccc")];
        assert_eq!(wrapped_height(&lines, 10), 3);
    }

    #[test]
    fn test_render_plain() {
        let out = render_plain(&segment("intro ```x``` outro"));
        let rule = "─".repeat(40);
        assert_eq!(out, format!("intro\n\n{rule}\nx\n{rule}\n\noutro\n"));
    }
}
