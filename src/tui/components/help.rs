use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::tui::theme;

const KEYBINDINGS: &[(&str, &str)] = &[
    ("↑ / ↓, k / j", "Move through documents"),
    ("Enter", "Open highlighted document"),
    ("Esc / Backspace", "Close document"),
    ("Tab", "Switch Overview / Indicators"),
    ("r", "Reload batch"),
    ("R", "Retry last failed request"),
    ("s", "Refresh statistics and consistency"),
    ("a / d", "Approve / Decline open document"),
    ("1 / 2 / 3", "Review / History / Settings"),
    ("?", "Toggle help"),
    ("q", "Quit"),
];

pub fn render(frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = KEYBINDINGS
        .iter()
        .map(|(key, desc)| {
            let content = vec![
                Span::styled(
                    format!("{:18}", key),
                    Style::default()
                        .fg(theme::LABEL)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" - "),
                Span::styled(*desc, Style::default().fg(Color::White)),
            ];
            ListItem::new(Line::from(content))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Keybindings")
            .border_style(Style::default().fg(theme::ACCENT)),
    );

    frame.render_widget(list, area);
}
