//! Semantic color palette for terminal output.
//!
//! Uses owo-colors for zero-allocation terminal coloring.

use owo_colors::{OwoColorize, Style};

/// Returns the style for success messages (green bold).
pub fn success_style() -> Style {
    Style::new().green().bold()
}

/// Returns the style for error messages (red bold).
pub fn error_style() -> Style {
    Style::new().red().bold()
}

/// Returns the style for warning messages (yellow).
pub fn warning_style() -> Style {
    Style::new().yellow()
}

/// Returns the style for muted/secondary text (dimmed).
pub fn muted_style() -> Style {
    Style::new().dimmed()
}

/// Returns the style for headers (bold).
pub fn header_style() -> Style {
    Style::new().bold()
}

/// Trait extension to apply semantic styles.
pub trait SemanticStyle: Sized {
    /// Apply success styling (green bold).
    fn success(&self) -> String;
    /// Apply error styling (red bold).
    fn error(&self) -> String;
    /// Apply warning styling (yellow).
    fn warning(&self) -> String;
    /// Apply muted styling (dimmed).
    fn muted(&self) -> String;
    /// Apply header styling (bold).
    fn header(&self) -> String;
}

impl<T: std::fmt::Display> SemanticStyle for T {
    fn success(&self) -> String {
        styled(self, success_style())
    }

    fn error(&self) -> String {
        styled(self, error_style())
    }

    fn warning(&self) -> String {
        styled(self, warning_style())
    }

    fn muted(&self) -> String {
        styled(self, muted_style())
    }

    fn header(&self) -> String {
        styled(self, header_style())
    }
}

fn styled(value: &impl std::fmt::Display, style: Style) -> String {
    if super::no_color() {
        value.to_string()
    } else {
        value.style(style).to_string()
    }
}
