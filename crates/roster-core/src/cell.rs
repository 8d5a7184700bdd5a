//! Visible text of a class cell: `Name (Level)` or `Name (Tag-Level)`.

use regex::Regex;
use std::sync::OnceLock;

static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"(?i)^\s*.*?\s*\(\s*(M2?-)?(\d{1,3})\s*\)\s*$").unwrap())
}

/// Render a class cell. `tag` is the raw prefix including its dash (`M-`).
pub fn format(char_name: &str, level: u32, tag: Option<&str>) -> String {
    match tag {
        Some(tag) => format!("{char_name} ({tag}{level})"),
        None => format!("{char_name} ({level})"),
    }
}

/// The `M-`/`M2-` tag of an existing cell, exactly as written there.
pub fn parse_tag(current: &str) -> Option<String> {
    tag_re()
        .captures(current)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// New text for a class cell. An edit keeps whatever tag `current` carries;
/// an add never introduces one.
pub fn rebuild(current: Option<&str>, char_name: &str, level: u32) -> String {
    let tag = current.and_then(parse_tag);
    format(char_name, level, tag.as_deref())
}

/// Whether `cell` holds the character `name`. Matches the `"<name> ("`
/// prefix case-insensitively so `Bob` does not match `Bobby (60)`.
pub fn holds_character(cell: &str, name: &str) -> bool {
    let prefix = format!("{name} (").to_lowercase();
    cell.trim().to_lowercase().starts_with(&prefix)
}
