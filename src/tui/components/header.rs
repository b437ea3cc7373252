use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::{app::App, theme};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.current_stats();
    let overall = stats.overall_status;

    let title = vec![
        Span::styled(
            "Upload Review",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Batch: {}", app.batch_id),
            Style::default().fg(Color::White),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("{} Overall: {}", overall.icon().glyph(), overall.label()),
            Style::default().fg(theme::risk_color(overall.color())),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Gateway: {}", app.config.gateway.base_url),
            Style::default().fg(theme::MUTED),
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT));

    let paragraph = Paragraph::new(Line::from(title))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
