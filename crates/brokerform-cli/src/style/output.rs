//! Output helper functions for consistent styled messages.
//!
//! Status messages go to stderr so stdout can carry a descriptor document.

use super::colors::SemanticStyle;

/// Prints a success message with a checkmark.
pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".success(), msg);
}

/// Prints an error message with an X mark.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".error(), msg);
}

/// Prints a warning message with a warning symbol.
pub fn print_warn(msg: &str) {
    eprintln!("{} {}", "⚠".warning(), msg);
}

/// Prints a hint/suggestion with an arrow.
pub fn print_hint(msg: &str) {
    eprintln!("{} {}", "→".muted(), msg.muted());
}

/// Prints a section heading.
pub fn print_heading(title: &str) {
    println!("{}", title.header());
}

/// Prints a labeled key-value pair with proper indentation.
pub fn print_labeled(key: &str, value: &str) {
    println!("  {}: {}", key.muted(), value);
}

/// Prints an empty line for spacing.
pub fn print_spacer() {
    println!();
}
