use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::{
    review::{classify, DetailState, DocumentDetail},
    tui::{
        app::{App, DetailTab},
        components::indicators,
        theme,
    },
    utils,
};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.snapshot.selected_id() {
        Some(id) => format!("Document {}", id),
        None => "Document".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(theme::ACCENT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (text, color) = match app.snapshot.detail_state() {
        DetailState::Loaded(detail) => {
            render_loaded(frame, inner, app, detail);
            return;
        }
        DetailState::None => (
            "Press Enter to open the highlighted document".to_string(),
            theme::MUTED,
        ),
        DetailState::Loading { id } => (format!("Loading {}...", id), Color::Gray),
        DetailState::Failed { reason, .. } => (
            format!("{}\n\nPress R to retry or Esc to go back", reason),
            Color::Red,
        ),
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

fn render_loaded(frame: &mut Frame, area: Rect, app: &App, detail: &DocumentDetail) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Tabs
            Constraint::Min(0),    // Body
        ])
        .split(area);

    let selected = match app.detail_tab {
        DetailTab::Overview => 0,
        DetailTab::Indicators => 1,
    };
    let tabs = Tabs::new(vec![
        "Overview".to_string(),
        format!("Indicators ({})", detail.indicators.len()),
    ])
    .select(selected)
    .style(Style::default().fg(Color::Gray))
    .highlight_style(
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(tabs, chunks[0]);

    match app.detail_tab {
        DetailTab::Overview => render_overview(frame, chunks[1], app, detail),
        DetailTab::Indicators => indicators::render(frame, chunks[1], detail),
    }
}

fn render_overview(frame: &mut Frame, area: Rect, app: &App, detail: &DocumentDetail) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let classification = classify(detail.score());
    let color = theme::risk_color(classification.color);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .percent(u16::from(classification.verified_percent))
        .label(format!(
            "{} {} · {}% verified",
            classification.icon.glyph(),
            classification.label(),
            classification.verified_percent
        ));
    frame.render_widget(gauge, chunks[0]);

    let decision = match &app.decision {
        Some(decision) => Span::styled(
            format!(
                "{} on {}",
                decision.decision,
                utils::format_timestamp(&decision.decided_at)
            ),
            Style::default().fg(theme::decision_color(decision.decision)),
        ),
        None => Span::styled("Pending", Style::default().fg(theme::MUTED)),
    };

    let lines = vec![
        field("Name", detail.display_name()),
        field("Address", detail.display_address()),
        field("Address complete", detail.display_address_complete()),
        field("Country", detail.display_country()),
        field("Document type", detail.display_document_type()),
        field("File type", detail.summary.file_kind.label()),
        field(
            "Uploaded",
            &utils::format_optional_timestamp(detail.summary.created_at.as_ref()),
        ),
        Line::from(vec![label("Decision"), decision]),
        Line::from(""),
        Line::from(label("Summary")),
        Line::from(detail.display_summary().to_string()),
    ];

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[2]);
}

fn label(name: &str) -> Span<'static> {
    Span::styled(
        format!("{:18}", name),
        Style::default().fg(theme::LABEL),
    )
}

fn field(name: &str, value: &str) -> Line<'static> {
    Line::from(vec![label(name), Span::raw(value.to_string())])
}
