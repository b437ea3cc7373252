use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::tui::{app::App, theme};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let config = &app.config;
    let settings = vec![
        ("Gateway URL", config.gateway.base_url.clone()),
        ("Request timeout", format!("{}s", config.gateway.timeout_secs)),
        ("Decision database", config.database.path.clone()),
        ("Tick rate", format!("{}ms", config.ui.tick_rate_ms)),
        (
            "Stats source",
            format!("{:?}", config.ui.default_stats_source).to_lowercase(),
        ),
        ("Log file", config.logging.file.clone()),
    ];

    let items: Vec<ListItem> = settings
        .iter()
        .map(|(key, value)| {
            let content = vec![
                Span::styled(format!("{:20}", key), Style::default().fg(theme::LABEL)),
                Span::raw(": "),
                Span::styled(value.as_str(), Style::default().fg(Color::White)),
            ];
            ListItem::new(Line::from(content))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Configuration")
            .border_style(Style::default().fg(theme::ACCENT)),
    );

    frame.render_widget(list, area);
}
