use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::{App, ConfirmPrompt};

use super::{centered_rect, HORIZONTAL_MARGIN, VERTICAL_MARGIN};

const KEYPAD: [[u32; 3]; 3] = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];

fn enabled_or_dim(style: Style, enabled: bool) -> Style {
    if enabled {
        style
    } else {
        style.add_modifier(Modifier::DIM)
    }
}

pub fn render_counter(app: &App, area: Rect, buf: &mut Buffer) {
    let tracker = &app.tracker;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),    // top padding
            Constraint::Length(1), // workout stopwatch
            Constraint::Length(1), // rest stopwatch
            Constraint::Length(1), // padding
            Constraint::Length(1), // total
            Constraint::Length(1), // padding
            Constraint::Length(3), // keypad
            Constraint::Length(1), // padding
            Constraint::Length(1), // undo / redo
            Constraint::Length(1), // session controls
            Constraint::Length(1), // status
            Constraint::Min(0),    // bottom padding
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled("workout ", italic_style),
        Span::styled(
            tracker.workout_display().to_string(),
            bold_style.fg(Color::Green),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("rest    ", italic_style),
        Span::styled(
            tracker.rest_display().to_string(),
            bold_style.fg(Color::Yellow),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        format!("Total Pull-ups: {}", tracker.total()),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    let keypad_style = enabled_or_dim(bold_style.fg(Color::Green), tracker.accepts_reps());
    let keypad: Vec<Line> = KEYPAD
        .iter()
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|n| Span::styled(format!(" [ {n} ] "), keypad_style))
                    .collect::<Vec<Span>>(),
            )
        })
        .collect();
    Paragraph::new(keypad)
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("(u)ndo", enabled_or_dim(bold_style, tracker.can_undo())),
        Span::raw("   "),
        Span::styled("(r)edo", enabled_or_dim(bold_style, tracker.can_redo())),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[8], buf);

    let active = tracker.is_active();
    Paragraph::new(Line::from(vec![
        Span::styled(
            "(s)tart",
            enabled_or_dim(italic_style.fg(Color::Green), !active),
        ),
        Span::styled(" / ", italic_style),
        Span::styled(
            "(x) submit",
            enabled_or_dim(italic_style.fg(Color::Red), active),
        ),
        Span::styled(" / ", italic_style),
        Span::styled("(h)istory", italic_style.fg(Color::Rgb(255, 170, 51))),
        Span::styled(" / (q)uit", italic_style),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[9], buf);

    if let Some(status) = &app.status {
        Paragraph::new(Span::styled(status.clone(), bold_style.fg(Color::Red)))
            .alignment(Alignment::Center)
            .render(chunks[10], buf);
    }

    if let Some(prompt) = &app.confirm {
        render_confirm(prompt, area, buf);
    }
}

fn render_confirm(prompt: &ConfirmPrompt, area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(48, 6, area);
    Clear.render(popup, buf);

    Paragraph::new(vec![
        Line::from(prompt.message()),
        Line::from(""),
        Line::from(Span::styled(
            "(y)es / (n)o",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(prompt.title())
            .style(Style::default().fg(Color::White)),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(popup, buf);
}
