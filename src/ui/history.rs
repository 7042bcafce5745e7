use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::app::App;
use crate::history::HistorySummary;

use super::{HORIZONTAL_MARGIN, VERTICAL_MARGIN};

fn summary_line(summary: &HistorySummary) -> String {
    match &summary.best {
        Some(best) => format!(
            "{} sessions · {} pull-ups · best {} on {}",
            summary.sessions,
            summary.total_pullups,
            best.pullups,
            best.local_date_label()
        ),
        None => "No sessions recorded yet.".to_string(),
    }
}

pub fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let view = &app.history_view;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(1), // summary
            Constraint::Min(0),    // table
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new("Training History")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        summary_line(&view.summary),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    if !view.records.is_empty() {
        // borders and header
        let table_height = chunks[2].height.saturating_sub(3) as usize;
        let total_rows = view.records.len();
        let offset = view.scroll_offset.min(total_rows.saturating_sub(1));

        let header = Row::new(vec![
            Cell::from("Date"),
            Cell::from("Pull-ups"),
            Cell::from("Time"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = view
            .records
            .iter()
            .skip(offset)
            .take(table_height)
            .map(|record| {
                Row::new(vec![
                    Cell::from(record.local_date_label()),
                    Cell::from(record.pullups.to_string()),
                    Cell::from(record.time.clone()),
                ])
            })
            .collect();

        let scroll_info = if total_rows > table_height {
            format!(" ({}/{} rows)", offset + rows.len(), total_rows)
        } else {
            String::new()
        };

        Table::new(
            rows,
            [
                Constraint::Length(22),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Sessions{scroll_info}")),
        )
        .render(chunks[2], buf);
    } else {
        Paragraph::new("Finish a workout to see it here.")
            .block(Block::default().borders(Borders::ALL).title("No Data"))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled(
        "↑/↓ PgUp/PgDn scroll | (b)ack | (q)uit",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Screen;
    use crate::history::{HistoryStore, SessionRecord};
    use crate::session::SessionTracker;
    use crate::ui::buffer_text;
    use chrono::{TimeZone, Utc};

    fn app_with(records: Vec<SessionRecord>) -> App {
        let mut store = HistoryStore::in_memory();
        for r in records {
            store.append(r).unwrap();
        }
        let mut app = App::new(SessionTracker::default(), store);
        app.navigate_to(Screen::History);
        app
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        buffer_text(&buf)
    }

    fn record(day: u32, pullups: u32) -> SessionRecord {
        SessionRecord::new(
            Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            pullups,
            "00:10:00",
        )
    }

    #[test]
    fn empty_history_message() {
        let app = app_with(vec![]);
        let text = render(&app, 80, 24);
        assert!(text.contains("Training History"));
        assert!(text.contains("No sessions recorded yet."));
    }

    #[test]
    fn lists_records_with_summary() {
        let app = app_with(vec![record(1, 10), record(2, 17)]);
        let text = render(&app, 90, 24);
        assert!(text.contains("2 sessions"));
        assert!(text.contains("27 pull-ups"));
        assert!(text.contains("best 17"));
        assert!(text.contains("17"));
        assert!(text.contains("00:10:00"));
    }

    #[test]
    fn scrolling_reports_position() {
        let records = (1..=20).map(|d| record(d, d)).collect();
        let mut app = app_with(records);
        app.history_view.scroll_offset = 5;
        // 12 rows tall leaves room for only a few table rows
        let text = render(&app, 90, 12);
        assert!(text.contains("/20 rows)"));
    }

    #[test]
    fn summary_line_formats() {
        assert_eq!(
            summary_line(&HistorySummary::default()),
            "No sessions recorded yet."
        );
    }
}
