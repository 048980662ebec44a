use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use ygpt_core::markup::{self, Segment};
use ygpt_core::ChatRole;
use crate::app::App;

/// Convert a line of answer text with inline markup into styled spans
fn markup_line(text: &str) -> Line<'static> {
    let spans: Vec<Span<'static>> = markup::parse(text)
        .into_iter()
        .flat_map(|segment| match segment {
            Segment::Text(t) => vec![Span::raw(t)],
            Segment::Bold(t) => vec![Span::styled(t, Style::default().add_modifier(Modifier::BOLD))],
            Segment::Italic(t) => {
                vec![Span::styled(t, Style::default().add_modifier(Modifier::ITALIC))]
            }
            Segment::Code(t) => vec![Span::styled(
                t,
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )],
            Segment::Link { label, url } => vec![
                Span::styled(label, Style::default().add_modifier(Modifier::UNDERLINED)),
                Span::styled(format!(" ({})", url), Style::default().fg(Color::DarkGray)),
            ],
        })
        .collect();

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, composer, footer
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

/// Cells taken by the badge: its text plus padding and a gap
fn badge_width(badge: &str) -> u16 {
    u16::try_from(badge.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(3)
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let [title_area, badge_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(badge_width(&app.config.badge).min(area.width / 2)),
    ])
    .areas(area);

    let title = Text::from(vec![
        Line::from(vec![
            Span::styled("  ", Style::default().bg(app.accent)),
            Span::raw(" "),
            Span::styled(app.config.title.clone(), Style::default().fg(app.accent).bold()),
        ]),
        Line::from(Span::styled(
            format!("   {}", app.config.subtitle),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);

    let badge = Paragraph::new(Span::styled(
        format!(" {} ", app.config.badge),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::REVERSED),
    ));
    frame.render_widget(badge, badge_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    if app.follow_output {
        app.scroll_chat_to_bottom();
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.accent));

    let mut lines: Vec<Line> = Vec::new();

    for msg in app.session.messages() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "🧑 You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(msg.content.clone()));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    format!("🤖 {}:", app.config.title),
                    Style::default().fg(app.accent).add_modifier(Modifier::BOLD),
                )));
                if msg.content.is_empty() {
                    lines.push(Line::default());
                }
                for line in msg.content.lines() {
                    lines.push(markup_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.session.is_busy() {
        // Bouncing dots: one highlighted dot moves across three
        let dots: Vec<Span> = (0..3u8)
            .map(|i| {
                let style = if i == app.animation_frame {
                    Style::default().fg(app.accent)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Span::styled("● ", style)
            })
            .collect();
        lines.push(Line::from(dots));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.session.is_busy() { Color::DarkGray } else { Color::Yellow };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Type your question… ");

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.session.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = if app.session.is_busy() {
        (" TYPING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" READY ", Style::default().bg(app.accent).fg(Color::Black))
    };

    let footer_content = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
