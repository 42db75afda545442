//! Terminal output utilities

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a stage banner, e.g. `[DEVELOPMENT]: deploy@dev.example.com`
pub fn stage(name: &str, target: &str) {
    println!(
        "\n{} {}",
        style(format!("[{}]:", name.to_uppercase())).cyan().bold(),
        target
    );
}

/// Print a list item
pub fn bullet(msg: &str) {
    println!("  {} {}", style("•").dim(), msg);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("    {}: {}", style(key).dim(), value);
}

/// Pretty-print a value as JSON
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
