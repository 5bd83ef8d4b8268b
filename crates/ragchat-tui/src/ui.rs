use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use ragchat_core::ChatRole;
use crate::app::{App, BackendStatus};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after_open = &rest[start + 2..];
        let Some(len) = after_open.find("**") else {
            break;
        };
        if len == 0 {
            // "****" carries no text; keep it literal
            spans.push(Span::raw(rest[..start + 4].to_string()));
            rest = &rest[start + 4..];
            continue;
        }

        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(
            after_open[..len].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after_open[len + 2..];
    }

    // Remaining text, including any unclosed ** as literal
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
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
    let (status_text, status_color) = match &app.backend_status {
        BackendStatus::Unknown => ("● checking".to_string(), Color::DarkGray),
        BackendStatus::Online => ("● online".to_string(), Color::Green),
        BackendStatus::Offline(_) => ("● offline".to_string(), Color::Red),
    };

    let title = Line::from(vec![
        Span::styled(" RAG PDF Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.client.base_url().to_string(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn role_line(role: ChatRole) -> Line<'static> {
    match role {
        ChatRole::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        ChatRole::Assistant => Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let inner = Block::default().borders(Borders::ALL).inner(area);

    let mut lines: Vec<Line> = Vec::new();

    for msg in app.conversation.entries() {
        lines.push(role_line(msg.role));
        match msg.role {
            ChatRole::User => {
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => {
                for line in msg.content.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.conversation.is_pending() {
        lines.push(role_line(ChatRole::Assistant));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    // Scroll limits come from the same word wrapping the widget renders with
    app.chat_height = inner.height;
    app.chat_lines = u16::try_from(chat.line_count(inner.width)).unwrap_or(u16::MAX);
    if app.follow_bottom || app.chat_scroll > app.max_scroll() {
        app.chat_scroll = app.max_scroll();
    }

    let chat = chat.block(chat_block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let pending = app.conversation.is_pending();
    let (title, border_color) = if pending {
        (" Waiting for answer... ", Color::DarkGray)
    } else {
        (" Ask query (Enter to send) ", Color::Yellow)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = app.input.visible(inner_width);

    let input = if app.input.is_empty() && !pending {
        Paragraph::new(Span::styled(
            "Type a question about your documents...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    }
    .block(input_block);

    frame.render_widget(input, area);

    let cursor_x = u16::try_from(cursor_x).unwrap_or(u16::MAX);
    frame.set_cursor_position((area.x.saturating_add(cursor_x).saturating_add(1), area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.status_message {
        Some(message) => Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Yellow),
        )),
        None => {
            let hints = [
                ("Enter", "send"),
                ("Ctrl+Y", "copy answer"),
                ("Ctrl+R", "rewrite query"),
                ("PgUp/Dn", "scroll"),
                ("Esc", "quit"),
            ];
            let mut spans = vec![Span::raw(" ")];
            for (i, (key, action)) in hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled("  ", Style::default()));
                }
                spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
                spans.push(Span::styled(
                    format!(" {}", action),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line), area);
}
