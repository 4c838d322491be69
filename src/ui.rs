//! Terminal styles for the form screen

use ratatui::style::{Color, Modifier, Style};

/// Styles keyed by what a widget is showing
pub struct Styles;

impl Styles {
    pub fn value() -> Style {
        Style::default()
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    /// Feedback text and the border of an invalid field
    pub fn invalid() -> Style {
        Style::default()
            .fg(Color::Red)
    }

    pub fn submitted() -> Style {
        Style::default()
            .fg(Color::Green)
    }

    pub fn pending() -> Style {
        Style::default()
            .fg(Color::Cyan)
    }

    /// Placeholders, disabled values and hints
    pub fn muted() -> Style {
        Style::default()
            .fg(Color::Gray)
    }

    /// Invalid wins over focus
    pub fn field_border(invalid: bool, focused: bool) -> Style {
        if invalid {
            Self::invalid()
        } else if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Self::muted()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_border_prefers_invalid_over_focus() {
        assert_eq!(Styles::field_border(true, true), Styles::invalid());
        assert_eq!(Styles::field_border(true, false), Styles::invalid());
        assert_eq!(Styles::field_border(false, true).fg, Some(Color::Yellow));
        assert_eq!(Styles::field_border(false, false), Styles::muted());
        assert_eq!(Styles::value(), Style::default());
    }
}
