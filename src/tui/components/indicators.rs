use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

use crate::{
    review::{title_case, DocumentDetail},
    tui::theme,
};

pub fn render(frame: &mut Frame, area: Rect, detail: &DocumentDetail) {
    if detail.indicators.is_empty() {
        let empty = List::new(vec![ListItem::new(Span::styled(
            "No indicators reported",
            Style::default().fg(theme::MUTED),
        ))]);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = detail
        .indicators
        .iter()
        .map(|indicator| {
            let heading = Line::from(vec![
                Span::styled(
                    format!("[{}] ", title_case(&indicator.category)),
                    Style::default().fg(theme::LABEL),
                ),
                Span::styled(
                    indicator.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", title_case(&indicator.indicator_id)),
                    Style::default().fg(theme::MUTED),
                ),
            ]);
            let description = Line::from(format!("  {}", indicator.description));
            ListItem::new(vec![heading, description, Line::from("")])
        })
        .collect();

    frame.render_widget(List::new(items), area);
}
