use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};
use unicode_width::UnicodeWidthChar;
use crate::app::App;
use crate::transcript;

const INPUT_PLACEHOLDER: &str = "Type something here...";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let [title_area, status_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(14),
    ])
    .areas(area);

    let title = Text::from(vec![
        Line::from(vec![
            Span::styled(" ZenAI ", Style::default().bg(Color::Cyan).fg(Color::Black).bold()),
            Span::raw(" "),
            Span::styled("Conversational AI Interface", Style::default().fg(Color::Cyan).bold()),
        ]),
        Line::from(Span::styled(
            " Chat resets every time you restart or start a new chat.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);

    // Status pill: busy while a request is in flight
    let pill_color = if app.loading { Color::Yellow } else { Color::Green };
    let status = Line::from(vec![
        Span::styled("● ", Style::default().fg(pill_color)),
        Span::styled(app.status_label(), Style::default().fg(pill_color).bold()),
        Span::raw(" "),
    ]);
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Right), status_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    if app.clamp_scroll_pending {
        app.clamp_scroll();
        app.clamp_scroll_pending = false;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Chat ({}) ", app.client.endpoint()));

    if app.show_empty_state() {
        let empty = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(
                "Start your first conversation",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Ask anything.", Style::default().fg(Color::DarkGray))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let lines = transcript::transcript_lines(&app.conversation, app.loading, app.animation_frame);
    let total_rows = transcript::wrapped_height(&lines, app.chat_width);

    // Code blocks rely on leading whitespace, so wrapped lines keep it
    let chat = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);

    if total_rows > app.chat_height {
        let mut scrollbar_state = ScrollbarState::new(
            total_rows.saturating_sub(app.chat_height) as usize,
        )
        .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.loading { Color::DarkGray } else { Color::Yellow };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(if app.loading { " ... " } else { " Send (Enter) " });

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = visible_input(&app.input, app.input_cursor, inner_width);

    let input = if app.input.is_empty() && !app.loading {
        Paragraph::new(INPUT_PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        let style = if app.loading {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        Paragraph::new(visible_text).style(style)
    };

    frame.render_widget(input.block(block), area);

    // Hide the cursor while the input is disabled
    if !app.loading && inner_width > 0 {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// Horizontal window of the input that keeps the cursor on screen, measured
/// in display columns. Returns the visible text and the cursor column.
fn visible_input(input: &str, cursor: usize, inner_width: usize) -> (String, u16) {
    let chars: Vec<(char, usize)> = input
        .chars()
        .map(|c| (c, UnicodeWidthChar::width(c).unwrap_or(0)))
        .collect();
    let cursor = cursor.min(chars.len());

    // The cursor needs a free column after the text before it
    let mut start = 0;
    let mut cursor_col: usize = chars[..cursor].iter().map(|(_, w)| w).sum();
    while start < cursor && cursor_col >= inner_width {
        cursor_col -= chars[start].1;
        start += 1;
    }

    let mut used = 0;
    let visible = chars[start..]
        .iter()
        .take_while(|(_, w)| {
            used += w;
            used <= inner_width
        })
        .map(|(c, _)| *c)
        .collect();

    (visible, cursor_col.min(u16::MAX as usize) as u16)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let disabled_style = Style::default().bg(Color::Black).fg(Color::DarkGray);

    let hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Ctrl+N ", key_style),
        Span::styled(
            " new chat ",
            if app.loading { disabled_style } else { label_style },
        ),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    let footer = Paragraph::new(Line::from(hints)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
