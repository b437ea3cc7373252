use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::{
    review::title_case,
    tui::{app::App, theme},
    utils,
};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["Decided", "Document", "Decision", "Score", "Note"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(theme::LABEL)));

    let header = Row::new(header_cells)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .height(1)
        .bottom_margin(1);

    let rows = app.history.iter().map(|entry| {
        let cells = vec![
            Cell::from(entry.decided_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::from(utils::format_id(&entry.document_id)),
            Cell::from(entry.decision.to_string())
                .style(Style::default().fg(theme::decision_color(entry.decision))),
            Cell::from(title_case(&entry.score)),
            Cell::from(entry.note.clone().unwrap_or_default()),
        ];

        Row::new(cells).height(1)
    });

    let widths = [
        Constraint::Percentage(18),
        Constraint::Percentage(18),
        Constraint::Percentage(12),
        Constraint::Percentage(14),
        Constraint::Percentage(38),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Decisions for batch {}", app.batch_id))
            .border_style(Style::default().fg(theme::ACCENT)),
    );

    frame.render_widget(table, area);
}
