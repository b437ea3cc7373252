use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::{
    tui::{
        app::{App, LogEntry, LogLevel},
        theme,
    },
    utils::format_id,
};

/// Newest-first activity for the session. Entries about the open document are bold.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let selected = app.snapshot.selected_id();
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .take((area.height as usize).saturating_sub(2))
        .map(|entry| ListItem::new(entry_line(entry, selected)))
        .collect();

    let problems = problem_count(&app.logs);
    let border = if problems.errors > 0 {
        Color::Red
    } else if problems.warnings > 0 {
        Color::Yellow
    } else {
        theme::MUTED
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title(problems))
            .border_style(Style::default().fg(border)),
    );

    frame.render_widget(list, area);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Problems {
    errors: usize,
    warnings: usize,
}

fn problem_count(logs: &[LogEntry]) -> Problems {
    logs.iter().fold(Problems::default(), |mut acc, entry| {
        match entry.level {
            LogLevel::Error => acc.errors += 1,
            LogLevel::Warning => acc.warnings += 1,
            LogLevel::Info | LogLevel::Success => {}
        }
        acc
    })
}

fn title(problems: Problems) -> String {
    let plural = |n: usize, word: &str| format!("{} {}{}", n, word, if n == 1 { "" } else { "s" });
    match (problems.errors, problems.warnings) {
        (0, 0) => "Activity".to_string(),
        (e, 0) => format!("Activity ({})", plural(e, "error")),
        (0, w) => format!("Activity ({})", plural(w, "warning")),
        (e, w) => format!("Activity ({}, {})", plural(e, "error"), plural(w, "warning")),
    }
}

fn level_style(level: LogLevel) -> (&'static str, Color) {
    match level {
        LogLevel::Info => ("·", theme::ACCENT),
        LogLevel::Success => ("✓", Color::Green),
        LogLevel::Warning => ("!", Color::Yellow),
        LogLevel::Error => ("✗", Color::Red),
    }
}

fn entry_line(entry: &LogEntry, selected: Option<&str>) -> Line<'static> {
    let (mark, color) = level_style(entry.level);
    let current = entry.document_id.is_some() && entry.document_id.as_deref() == selected;
    let text_style = if current {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(
            entry.timestamp.format("%H:%M:%S ").to_string(),
            Style::default().fg(theme::MUTED),
        ),
        Span::styled(format!("{} ", mark), Style::default().fg(color)),
    ];
    if let Some(id) = &entry.document_id {
        spans.push(Span::styled(
            format!("[{}] ", format_id(id)),
            Style::default().fg(theme::LABEL),
        ));
    }
    spans.push(Span::styled(entry.message.clone(), text_style));

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(level: LogLevel, document_id: Option<&str>, message: &str) -> LogEntry {
        LogEntry {
            level,
            timestamp: Utc::now(),
            document_id: document_id.map(str::to_string),
            message: message.to_string(),
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_title_counts_problems() {
        let mut logs = vec![entry(LogLevel::Info, None, "Opening batch u1")];
        assert_eq!(title(problem_count(&logs)), "Activity");

        logs.push(entry(LogLevel::Error, Some("a"), "Failed to load: HTTP 500"));
        assert_eq!(title(problem_count(&logs)), "Activity (1 error)");

        logs.push(entry(LogLevel::Warning, None, "No documents found"));
        logs.push(entry(LogLevel::Warning, None, "retry: timed out"));
        assert_eq!(title(problem_count(&logs)), "Activity (1 error, 2 warnings)");
    }

    #[test]
    fn test_document_entries_are_tagged() {
        let line = entry_line(
            &entry(LogLevel::Success, Some("6714f0c2a9e3b81d"), "Detail loaded"),
            None,
        );
        assert!(text(&line).ends_with("✓ [6714f0c2a9e…] Detail loaded"));

        let line = entry_line(&entry(LogLevel::Info, None, "Reloading batch u1"), None);
        assert!(!text(&line).contains('['));
    }

    #[test]
    fn test_open_document_entries_are_bold() {
        let about_a = entry(LogLevel::Success, Some("a"), "Approved at score TRUSTED");
        let bold = |line: &Line| {
            line.spans
                .last()
                .map(|s| s.style.add_modifier.contains(Modifier::BOLD))
                .unwrap_or(false)
        };

        assert!(bold(&entry_line(&about_a, Some("a"))));
        assert!(!bold(&entry_line(&about_a, Some("b"))));
        assert!(!bold(&entry_line(&entry(LogLevel::Info, None, "x"), None)));
    }
}
