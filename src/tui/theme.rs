use ratatui::style::Color;

use crate::{review::risk::ColorClass, storage::Decision};

pub const ACCENT: Color = Color::Cyan;
pub const MUTED: Color = Color::DarkGray;
pub const LABEL: Color = Color::Yellow;

pub fn risk_color(color: ColorClass) -> Color {
    match color {
        ColorClass::Danger => Color::Red,
        ColorClass::Caution => Color::Yellow,
        ColorClass::Neutral => Color::Blue,
        ColorClass::Safe => Color::Green,
    }
}

pub fn decision_color(decision: Decision) -> Color {
    match decision {
        Decision::Approved => Color::Green,
        Decision::Declined => Color::Red,
    }
}
