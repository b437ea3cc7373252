use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::tui::{app::App, components};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Stats
            Constraint::Min(0),    // Documents + detail
            Constraint::Length(7), // Activity
        ])
        .split(area);

    components::stats::render(frame, chunks[0], app);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    components::document_list::render(frame, panes[0], app);
    components::detail::render(frame, panes[1], app);

    components::activity::render(frame, chunks[2], app);
}
