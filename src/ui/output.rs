//! Output functions for consistent build log formatting

use console::style;

/// Buildpack banner, printed once per phase
pub fn header(title: &str, version: &str) {
    println!("{} {}", style(title).cyan().bold(), style(version).dim());
}

/// Completed step
pub fn step_ok(message: &str) {
    println!("  {} {}", style("[OK]").green(), message);
}

/// Informational step
pub fn step_info(message: &str) {
    println!("  {} {}", style("[INFO]").cyan(), message);
}

/// Warning; printed in full, never wrapped
pub fn step_warn(message: &str) {
    println!("  {} {}", style("[WARN]").yellow(), message);
}

/// Indented key/value detail line
pub fn key_value(key: &str, value: &str) {
    println!("    {}: {}", style(key).bold(), value);
}
