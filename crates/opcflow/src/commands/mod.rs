pub mod access_rule;
pub mod db;
pub mod lb;
pub mod ssh_key;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use std::path::Path;

/// Read a public key file, trimming the trailing newline
pub fn read_key_file(path: &Path) -> anyhow::Result<String> {
    let key = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read key file {}", path.display()))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Key file {} is empty", path.display());
    }
    Ok(key.to_string())
}

/// Green for settled states, red for failures, yellow for anything in flight
pub(crate) fn paint_state(state: &str, ok: &[&str], bad: &[&str]) -> ColoredString {
    let label = if state.is_empty() { "UNKNOWN" } else { state };
    if ok.iter().any(|s| s.eq_ignore_ascii_case(state)) {
        label.green()
    } else if bad.iter().any(|s| s.eq_ignore_ascii_case(state)) {
        label.red()
    } else {
        label.yellow()
    }
}

pub(crate) fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<18} {}", format!("{}:", label).bold(), value);
}
