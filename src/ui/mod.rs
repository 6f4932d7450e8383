// UI module for rendering the TUI.
// Lays out the header, the stats panels or loading/error views, and the status bar.

mod panels;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, LoadingState};

/// Main draw function that renders the entire UI.
pub fn draw<S>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);
}

fn draw_header<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " GitHub Analytics ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("@{}", app.username()),
            Style::default().fg(Color::White),
        ),
    ]);

    let header = Paragraph::new(title).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, area);
}

fn draw_content<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    match &app.stats {
        LoadingState::Idle => {
            let text = Paragraph::new("Press r to load GitHub statistics")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(text, area);
        }
        LoadingState::Loading => {
            let lines = vec![
                Line::from(Span::styled(
                    "⏳ Loading GitHub Analytics",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Fetching your latest GitHub statistics...",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            let text = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(text, centered_rows(area, 4));
        }
        LoadingState::Error(message) => {
            let lines = vec![
                Line::from(Span::styled(
                    "Something went wrong",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("❌ {}", message),
                    Style::default().fg(Color::Red),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Press ", Style::default().fg(Color::DarkGray)),
                    Span::styled("r", Style::default().fg(Color::Yellow)),
                    Span::styled(" to try again", Style::default().fg(Color::DarkGray)),
                ]),
            ];
            let text = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                );
            frame.render_widget(text, centered_rows(area, 8));
        }
        LoadingState::Loaded(stats) => panels::draw_dashboard(frame, stats, area),
    }
}

/// Draw the status bar with key hints and data age.
fn draw_status_bar<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let hint = |h: &'static str| Span::styled(h, Style::default().fg(Color::DarkGray));

    let mut spans = vec![
        key(" r"),
        hint(" retry  "),
        key("R"),
        hint(" refresh  "),
        key("q"),
        hint(" quit"),
    ];

    if let Some(loaded_at) = app.loaded_at {
        spans.push(hint(" │ "));
        spans.push(Span::styled(
            format!("updated {}", loaded_at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A full-width band of `height` rows centered vertically in `area`.
fn centered_rows(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    let y = area.y + (area.height - height) / 2;
    Rect::new(area.x, y, area.width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rows() {
        let area = Rect::new(0, 2, 80, 20);
        let band = centered_rows(area, 4);
        assert_eq!(band, Rect::new(0, 10, 80, 4));
    }

    #[test]
    fn test_centered_rows_clamps() {
        let area = Rect::new(0, 0, 10, 3);
        assert_eq!(centered_rows(area, 8), area);
    }
}
