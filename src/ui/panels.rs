// Dashboard panels.
// Bar charts for totals and monthly contributions, plus language and top repository lists.

use ratatui::{prelude::*, widgets::*};

use crate::stats::AggregatedStats;

const ACCENT: Color = Color::Rgb(100, 255, 218);
const LANGUAGE_BAR_WIDTH: usize = 20;

/// Draw the loaded dashboard: charts on top, lists below.
pub fn draw_dashboard(frame: &mut Frame, stats: &AggregatedStats, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_totals(frame, stats, top[0]);
    draw_contributions(frame, stats, top[1]);
    draw_languages(frame, stats, bottom[0]);
    draw_top_repos(frame, stats, bottom[1]);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

fn draw_totals(frame: &mut Frame, stats: &AggregatedStats, area: Rect) {
    let totals = stats.stats;
    let values = [
        ("Repos", totals.public_repos),
        ("Stars", totals.stars),
        ("Forks", totals.forks),
        ("Issues", totals.issues),
        ("PRs", totals.pull_requests),
    ];

    let bars: Vec<Bar> = values
        .iter()
        .map(|(label, value)| Bar::default().label(Line::from(*label)).value(*value))
        .collect();

    let chart = BarChart::default()
        .block(panel("GitHub Statistics"))
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(ACCENT))
        .value_style(Style::default().fg(Color::Black).bg(ACCENT))
        .label_style(Style::default().fg(Color::White))
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn draw_contributions(frame: &mut Frame, stats: &AggregatedStats, area: Rect) {
    if stats.contributions.is_empty() {
        render_empty(frame, panel("Contributions"), "No contribution data", area);
        return;
    }

    // "Mar 2026" -> "Mar" keeps twelve bars readable
    let bars: Vec<Bar> = stats
        .contributions
        .iter()
        .map(|point| {
            let month = point.date.split_whitespace().next().unwrap_or(&point.date);
            Bar::default()
                .label(Line::from(month.to_string()))
                .value(point.count)
        })
        .collect();

    let total: u64 = stats.contributions.iter().map(|p| p.count).sum();
    let chart = BarChart::default()
        .block(panel(&format!("Contributions, last 12 months: {}", total)))
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green))
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn draw_languages(frame: &mut Frame, stats: &AggregatedStats, area: Rect) {
    let shares = stats.language_shares();
    if shares.is_empty() {
        render_empty(frame, panel("Languages"), "No language data", area);
        return;
    }

    let name_width = shares.iter().map(|(name, _, _)| name.len()).max().unwrap_or(0);
    let items: Vec<ListItem> = shares
        .iter()
        .map(|(name, _, pct)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<width$} ", name, width = name_width),
                    Style::default().fg(Color::White),
                ),
                Span::styled(share_bar(*pct), Style::default().fg(ACCENT)),
                Span::styled(
                    format!(" {:>5.1}%", pct),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(panel("Languages")), area);
}

fn draw_top_repos(frame: &mut Frame, stats: &AggregatedStats, area: Rect) {
    if stats.top_repos.is_empty() {
        render_empty(frame, panel("Top Repositories"), "No starred or forked repositories", area);
        return;
    }

    let items: Vec<ListItem> = stats
        .top_repos
        .iter()
        .map(|repo| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        repo.name.clone(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  ★ {}", repo.stars),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        format!("  ⑂ {}", repo.forks),
                        Style::default().fg(Color::Cyan),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", repo.url),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    frame.render_widget(List::new(items).block(panel("Top Repositories")), area);
}

fn render_empty(frame: &mut Frame, block: Block<'_>, message: &str, area: Rect) {
    let text = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(text, area);
}

/// Horizontal bar proportional to a percentage.
fn share_bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * LANGUAGE_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(LANGUAGE_BAR_WIDTH);
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(LANGUAGE_BAR_WIDTH - filled)
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::stats::{ContributionPoint, TopRepo, Totals};

    #[test]
    fn test_share_bar() {
        assert_eq!(share_bar(0.0), "░".repeat(20));
        assert_eq!(share_bar(100.0), "█".repeat(20));
        assert_eq!(share_bar(50.0).chars().filter(|c| *c == '█').count(), 10);
    }

    #[test]
    fn test_dashboard_renders_top_repo() {
        let stats = AggregatedStats {
            contributions: vec![ContributionPoint {
                date: "Mar 2026".to_string(),
                count: 12,
            }],
            languages: BTreeMap::from([("Rust".to_string(), 900), ("Shell".to_string(), 100)]),
            stats: Totals {
                public_repos: 4,
                stars: 20,
                forks: 3,
                issues: 1,
                pull_requests: 7,
            },
            top_repos: vec![TopRepo {
                name: "ghfolio".to_string(),
                stars: 20,
                forks: 3,
                url: "https://github.com/someone/ghfolio".to_string(),
            }],
        };

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|frame| draw_dashboard(frame, &stats, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rendered: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("ghfolio"));
        assert!(rendered.contains("Languages"));
        assert!(rendered.contains("Rust"));
    }
}
