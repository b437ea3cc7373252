use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    review::{risk::ColorClass, BatchStats, ConsistencyResult},
    tui::{app::App, theme},
};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.current_stats();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(14),
            Constraint::Percentage(14),
            Constraint::Percentage(14),
            Constraint::Percentage(14),
            Constraint::Percentage(14),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_stat(
        frame,
        chunks[0],
        "Documents",
        stats.total_documents.to_string(),
        theme::ACCENT,
    );

    let colors = [
        ColorClass::Danger,
        ColorClass::Caution,
        ColorClass::Neutral,
        ColorClass::Safe,
    ];
    for ((label, count), (chunk, color)) in stats
        .buckets()
        .into_iter()
        .zip(chunks[1..5].iter().zip(colors))
    {
        render_stat(
            frame,
            *chunk,
            label,
            format!("{} ({:.0}%)", count, stats.percent_of_total(count)),
            theme::risk_color(color),
        );
    }

    render_consistency(frame, chunks[5], app, &stats);
}

fn render_stat(frame: &mut Frame, area: Rect, label: &str, value: String, color: Color) {
    let text = vec![
        Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::MUTED));

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_consistency(frame: &mut Frame, area: Rect, app: &App, stats: &BatchStats) {
    let lines = match &stats.is_consistent {
        Some(result) => consistency_lines(result),
        None if app.stats_loading => vec![Line::from("Checking consistency...")],
        None if stats.skipped_details > 0 => vec![Line::from(Span::styled(
            format!("Undecided: {} documents failed to load", stats.skipped_details),
            Style::default().fg(Color::Yellow),
        ))],
        None => vec![Line::from(Span::styled(
            "Press s to check consistency",
            Style::default().fg(theme::MUTED),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Consistency")
        .border_style(Style::default().fg(theme::MUTED));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn consistency_lines(result: &ConsistencyResult) -> Vec<Line<'static>> {
    [("Name", result.name_consistent), ("Address", result.address_consistent)]
        .into_iter()
        .map(|(field, consistent)| {
            let (mark, text, color) = if consistent {
                ("✓", "same in all documents", Color::Green)
            } else {
                ("✗", "not same in all documents", Color::Red)
            };
            Line::from(vec![
                Span::styled(format!("{} ", mark), Style::default().fg(color)),
                Span::raw(format!("{}: {}", field, text)),
            ])
        })
        .collect()
}
