use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn build_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "SUCCESS",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Section => "",
    }
}

/// Plain-text rendering of a message, before any colour is applied.
pub fn format_message(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{}: {}", build_label(kind), text),
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let base = format_message(kind, message);
    match kind {
        MessageKind::Info => base.cyan().to_string(),
        MessageKind::Success => base.green().to_string(),
        MessageKind::Warning => base.yellow().to_string(),
        MessageKind::Error => base.red().bold().to_string(),
        MessageKind::Section => base.bold().to_string(),
    }
}

pub fn info(message: impl fmt::Display) {
    println!("{}", apply_style(MessageKind::Info, message));
}

pub fn success(message: impl fmt::Display) {
    println!("{}", apply_style(MessageKind::Success, message));
}

pub fn warning(message: impl fmt::Display) {
    println!("{}", apply_style(MessageKind::Warning, message));
}

pub fn error(message: impl fmt::Display) {
    eprintln!("{}", apply_style(MessageKind::Error, message));
}

pub fn section(title: impl fmt::Display) {
    println!("{}", apply_style(MessageKind::Section, title));
}

/// Prints raw report text without styling.
pub fn plain(text: impl fmt::Display) {
    println!("{text}");
}

/// Prints each entry on its own indented line, or a placeholder when empty.
pub fn list<S: AsRef<str>>(entries: &[S]) {
    if entries.is_empty() {
        println!("  (none)");
        return;
    }
    for entry in entries {
        println!("  {}", entry.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_label() {
        assert_eq!(
            format_message(MessageKind::Success, "Saved K Bank"),
            "SUCCESS: Saved K Bank"
        );
        assert_eq!(format_message(MessageKind::Section, " Accounts "), "=== Accounts ===");
    }
}
