//! Cell notes as an ordered `Key: Value` store.
//!
//! A note is newline-delimited text. Each non-blank line is split at its
//! first colon into a trimmed key and value; a line without a colon is kept
//! as a bare key and written back verbatim. Keys keep the position of their
//! first appearance, and a repeated key overwrites the earlier value in place.
//!
//! Values are not escaped. A value containing a newline is read back as
//! several keys on the next parse.

use std::fmt;

pub const DISCORD_ID_KEY: &str = "Discord ID";
pub const AA_KEY: &str = "AA";
pub const ACCESS_KEY: &str = "Access";

#[derive(Debug, Clone, PartialEq, Eq)]
struct NoteEntry {
    key: String,
    /// `None` for a line that had no colon.
    value: Option<String>,
}

/// Decoded form of a cell note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellNote {
    entries: Vec<NoteEntry>,
}

impl CellNote {
    pub fn parse(text: &str) -> Self {
        let mut note = CellNote::default();
        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }
            match line.find(':') {
                Some(idx) if idx > 0 => {
                    note.put(line[..idx].trim(), Some(line[idx + 1..].trim().to_string()));
                }
                _ => note.put(line, None),
            }
        }
        note
    }

    fn put(&mut self, key: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(NoteEntry {
                key: key.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_deref().unwrap_or(""))
    }

    /// Like [`CellNote::get`] but ASCII case-insensitive on the key. When
    /// several keys match, the last one wins.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value.as_deref().unwrap_or(""))
    }

    /// Keys in output order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set `key` to `value`. An empty value is a no-op, never a deletion.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.put(key, Some(value));
    }

    /// Apply every update in order, with [`CellNote::set`] semantics.
    pub fn merge<K, V, I>(&mut self, updates: I)
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in updates {
            self.set(key.as_ref(), value);
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            match &entry.value {
                Some(v) => write!(f, "{}: {}", entry.key, v)?,
                None => f.write_str(&entry.key)?,
            }
        }
        Ok(())
    }
}

/// Parse `existing`, merge `updates` into it and render the result.
pub fn merge_note<K, V, I>(existing: &str, updates: I) -> String
where
    K: AsRef<str>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut note = CellNote::parse(existing);
    note.merge(updates);
    note.render()
}

/// The `Discord ID` recorded in an identity note, if any.
pub fn discord_id(note: &str) -> Option<String> {
    CellNote::parse(note)
        .get(DISCORD_ID_KEY)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The comma-joined `Access` labels of a class-cell note. The key is matched
/// case-insensitively so hand-typed `access:` lines count.
pub fn access_labels(note: &str) -> Vec<String> {
    CellNote::parse(note)
        .get_ignore_case(ACCESS_KEY)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_at_first_colon() {
        let note = CellNote::parse("Discord ID: 123\nLink: https://x.y/z");
        assert_eq!(note.get("Discord ID"), Some("123"));
        assert_eq!(note.get("Link"), Some("https://x.y/z"));
    }

    #[test]
    fn parse_drops_blank_lines_and_handles_crlf() {
        let note = CellNote::parse("AA: 10\r\n\r\n   \r\nAccess: Sleeper\r\n");
        assert_eq!(note.len(), 2);
        assert_eq!(note.get("Access"), Some("Sleeper"));
    }

    #[test]
    fn merge_overwrites_and_keeps_order() {
        let out = merge_note("A: 1\nB: 2", [("B", "3")]);
        assert_eq!(out, "A: 1\nB: 3");
    }

    #[test]
    fn merge_empty_value_is_noop() {
        let out = merge_note("A: 1\nB: 2", [("C", "")]);
        assert_eq!(out, "A: 1\nB: 2");
        let out = merge_note("A: 1\nB: 2", [("A", "")]);
        assert_eq!(out, "A: 1\nB: 2");
    }

    #[test]
    fn merge_appends_new_keys_at_end() {
        let out = merge_note("Raid: Tue", [("AA", "250"), ("Access", "Veeshan, Sleeper")]);
        assert_eq!(out, "Raid: Tue\nAA: 250\nAccess: Veeshan, Sleeper");
    }

    #[test]
    fn colonless_line_round_trips_verbatim() {
        let out = merge_note("officer alt\nAA: 5", [("AA", "6")]);
        assert_eq!(out, "officer alt\nAA: 6");
    }

    #[test]
    fn duplicate_key_keeps_first_position_last_value() {
        let note = CellNote::parse("A: 1\nB: 2\nA: 3");
        assert_eq!(note.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(note.get("A"), Some("3"));
    }

    #[test]
    fn discord_id_lookup() {
        assert_eq!(discord_id("Discord ID: 998877"), Some("998877".into()));
        assert_eq!(discord_id("Discord ID:"), None);
        assert_eq!(discord_id("nothing here"), None);
    }

    #[test]
    fn access_labels_split_and_trim() {
        assert_eq!(
            access_labels("AA: 1\nAccess: Veeshan ,  Sleeper,"),
            vec!["Veeshan".to_string(), "Sleeper".to_string()]
        );
        assert!(access_labels("AA: 1").is_empty());
    }

    #[test]
    fn access_key_matches_any_case() {
        assert_eq!(
            access_labels("  access : Vex Thal, Sleeper"),
            vec!["Vex Thal".to_string(), "Sleeper".to_string()]
        );
        assert_eq!(access_labels("ACCESS: Veeshan"), vec!["Veeshan".to_string()]);
    }

    #[test]
    fn merged_access_wins_over_hand_typed_line() {
        let out = merge_note("access: Old", [(ACCESS_KEY, "New")]);
        assert_eq!(access_labels(&out), vec!["New".to_string()]);
    }

    #[test]
    fn newline_in_value_splits_on_reparse() {
        let out = merge_note("", [("Access", "a\nb: c")]);
        let reparsed = CellNote::parse(&out);
        assert_eq!(reparsed.get("Access"), Some("a"));
        assert_eq!(reparsed.get("b"), Some("c"));
    }
}
