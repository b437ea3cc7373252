use colored::{ColoredString, Colorize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::review::risk::{classify, ColorClass};

/// Score tag as Title Case, colored by its tier.
pub fn format_score(score: &str) -> String {
    let classification = classify(score);
    let label = if score.trim().is_empty() {
        classification.label()
    } else {
        crate::review::risk::title_case(score)
    };
    paint(&label, classification.color).to_string()
}

fn paint(text: &str, color: ColorClass) -> ColoredString {
    match color {
        ColorClass::Danger => text.red().bold(),
        ColorClass::Caution => text.yellow(),
        ColorClass::Neutral => text.blue(),
        ColorClass::Safe => text.green(),
    }
}

/// Format a document id truncated for display
pub fn format_id(id: &str) -> String {
    truncate(id, 12)
}

/// Cut `text` to at most `max` terminal columns, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Format timestamp in human-readable format
pub fn format_timestamp(timestamp: &chrono::DateTime<chrono::Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_optional_timestamp(timestamp: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    timestamp
        .map(format_timestamp)
        .unwrap_or_else(|| crate::review::models::NOT_FOUND.to_string())
}

/// Prompt user for yes/no confirmation
pub fn confirm_action(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} (y/N): ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print a formatted table border
pub fn print_table_border(width: usize) {
    println!("{}", "=".repeat(width));
}

/// Print a table row with columns. Widths are in terminal columns, so colored
/// or wide text still lines up.
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    let mut row = String::new();
    for (col, width) in columns.iter().zip(widths) {
        let visible = strip_ansi(col).width();
        row.push_str(col);
        row.push_str(&" ".repeat(width.saturating_sub(visible) + 2));
    }
    println!("{}", row.trim_end());
}

fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip to the end of the CSI sequence.
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 12), "short");
        assert_eq!(truncate("6714f0c2a9e3b81d", 12), "6714f0c2a9e…");
        assert_eq!(truncate("6714f0c2a9e3b81d", 12).width(), 12);
    }

    #[test]
    fn test_strip_ansi() {
        colored::control::set_override(true);
        let painted = "Warning".yellow().to_string();
        assert_eq!(strip_ansi(&painted), "Warning");
        colored::control::unset_override();
    }

    #[test]
    fn test_format_optional_timestamp() {
        assert_eq!(format_optional_timestamp(None), "Not Found");
    }
}
