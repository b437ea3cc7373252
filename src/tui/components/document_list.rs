use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::{
    review::{classify, title_case, ListState},
    tui::{app::App, theme},
    utils,
};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Documents ({})", app.snapshot.documents().len()))
        .border_style(Style::default().fg(theme::ACCENT));

    let message = match app.snapshot.list_state() {
        ListState::Idle => Some(("No batch loaded".to_string(), theme::MUTED)),
        ListState::Loading => Some(("Loading documents...".to_string(), Color::Gray)),
        ListState::Failed { reason } => {
            Some((format!("{}\n\nPress R to retry", reason), Color::Red))
        }
        ListState::Loaded(_) if app.snapshot.no_documents_found() => {
            Some(("No documents found".to_string(), theme::MUTED))
        }
        ListState::Loaded(_) => None,
    };

    if let Some((text, color)) = message {
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header_cells = ["", "Document", "Score", "Type", "Uploaded"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(theme::LABEL)));

    let header = Row::new(header_cells)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .height(1)
        .bottom_margin(1);

    let selected = app.snapshot.selected_id();
    let rows = app.snapshot.documents().iter().map(|document| {
        let classification = classify(&document.score);
        let color = theme::risk_color(classification.color);
        let mut id_style = Style::default();
        if selected == Some(document.id.as_str()) {
            id_style = id_style.fg(theme::ACCENT).add_modifier(Modifier::BOLD);
        }

        let cells = vec![
            Cell::from(classification.icon.glyph()).style(Style::default().fg(color)),
            Cell::from(utils::format_id(&document.id)).style(id_style),
            Cell::from(title_case(&document.score)).style(Style::default().fg(color)),
            Cell::from(document.file_kind.label()),
            Cell::from(
                document
                    .created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        ];

        Row::new(cells).height(1)
    });

    let widths = [
        Constraint::Length(2),
        Constraint::Percentage(35),
        Constraint::Percentage(25),
        Constraint::Percentage(12),
        Constraint::Percentage(28),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut state = TableState::default();
    state.select(Some(app.cursor));

    frame.render_stateful_widget(table, area, &mut state);
}
