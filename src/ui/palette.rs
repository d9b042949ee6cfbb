//! Styles shared by the page widgets.
//!
//! Category colors follow the web dashboard's badge palette; everything else
//! is a small set of semantic roles so widgets never hardcode colors inline.

use ratatui::style::{Color, Modifier, Style};

/// Badge color for a category. Unknown categories get the AI color.
pub fn category_color(category: &str) -> Color {
    known_category_color(category).unwrap_or(Color::Blue)
}

/// Chip color for a category. Unknown categories render gray.
pub fn chip_color(category: &str) -> Color {
    known_category_color(category).unwrap_or(Color::Gray)
}

fn known_category_color(category: &str) -> Option<Color> {
    let color = match category {
        "AI" => Color::Blue,
        "LLMs" => Color::Magenta,
        "Robotics" => Color::Green,
        "Tools" | "AI Tool" => Color::Rgb(255, 165, 0),
        "Research" => Color::Red,
        "Innovation" | "Innovations" => Color::Yellow,
        "Industry" => Color::Indexed(63),
        _ => return None,
    };
    Some(color)
}

pub fn badge(category: &str) -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(category_color(category))
        .add_modifier(Modifier::BOLD)
}

pub fn chip(category: &str, selected: bool) -> Style {
    let color = chip_color(category);
    if selected {
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    }
}

pub fn border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

pub fn title() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn metadata() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn summary() -> Style {
    Style::default().fg(Color::Gray)
}

pub fn keyword() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn selected() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

pub fn error() -> Style {
    Style::default().fg(Color::Red)
}

pub fn hint() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn status_bar() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

pub fn heading() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_share_badge_and_chip_color() {
        for name in ["AI", "LLMs", "Robotics", "Tools", "AI Tool", "Research", "Industry"] {
            assert_eq!(category_color(name), chip_color(name), "{}", name);
        }
        assert_eq!(category_color("Innovations"), Color::Yellow);
    }

    #[test]
    fn unknown_category_fallbacks_differ() {
        assert_eq!(category_color("Quantum"), Color::Blue);
        assert_eq!(chip_color("Quantum"), Color::Gray);
    }
}
