//! Display formatting for CLI output

use console::style;
use crdform_core::{Diagnostics, Severity};
use similar::{ChangeTag, TextDiff};

/// Print diagnostics to stderr, one block per diagnostic
pub fn print_diagnostics(diags: &Diagnostics) {
    for diag in diags.iter() {
        let icon = match diag.severity {
            Severity::Error => style("✗").red(),
            Severity::Warning => style("⚠").yellow(),
        };
        let location = diag
            .attribute
            .as_deref()
            .map(|path| format!(" at {}", style(path).dim()))
            .unwrap_or_default();

        eprintln!("  {} {}{}", icon, diag.summary, location);
        if !diag.detail.is_empty() {
            eprintln!("    {}", diag.detail);
        }
    }
}

/// Unified line diff of two YAML documents
pub fn render_diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let line = change.value().trim_end();
        let rendered = match change.tag() {
            ChangeTag::Delete => style(format!("- {}", line)).red().to_string(),
            ChangeTag::Insert => style(format!("+ {}", line)).green().to_string(),
            ChangeTag::Equal => format!("  {}", line),
        };
        out.push_str(&rendered);
        out.push('\n');
    }
    out
}

pub fn step(message: impl std::fmt::Display) {
    println!("{} {}", style("→").blue().bold(), message);
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn warning(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}
