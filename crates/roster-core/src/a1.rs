//! A1-notation helpers for the two sheets the bot touches.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

pub const ROSTER_SHEET: &str = "Roster";
pub const RAW_DATA_SHEET: &str = "Raw Discord Data";

/// Convert a 1-based column index to its letter form (1 → A, 27 → AA).
pub fn column_letter(column: u32) -> String {
    let mut n = column;
    let mut out = Vec::new();
    while n > 0 {
        let m = (n - 1) % 26;
        out.push(b'A' + m as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Quote a sheet title for use as a range prefix, doubling apostrophes.
pub fn quoted_sheet(title: &str) -> String {
    format!("'{}'!", title.replace('\'', "''"))
}

/// A single cell on the `Roster` sheet, both coordinates 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

impl CellRef {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Column A of `row`, where the member identity lives.
    pub fn identity(row: u32) -> Self {
        Self::new(row, 1)
    }

    /// `Roster!D7`
    pub fn a1(&self) -> String {
        format!("{ROSTER_SHEET}!{}{}", column_letter(self.column), self.row)
    }

    /// `Roster!D7:D7`, the form the grid-data endpoint wants for one cell.
    pub fn a1_span(&self) -> String {
        let col = column_letter(self.column);
        format!("{ROSTER_SHEET}!{col}{row}:{col}{row}", row = self.row)
    }

    pub fn row_index(&self) -> u32 {
        self.row - 1
    }

    pub fn column_index(&self) -> u32 {
        self.column - 1
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.column), self.row)
    }
}

static UPDATED_RANGE_RE: OnceLock<Regex> = OnceLock::new();

fn updated_range_re() -> &'static Regex {
    UPDATED_RANGE_RE.get_or_init(|| Regex::new(r"!\$?[A-Z]+\$?(\d+)").unwrap())
}

/// Extract the first row number from an append response's `updatedRange`
/// (`Roster!A12` or `Roster!A12:A12`).
pub fn row_from_updated_range(updated_range: &str) -> Option<u32> {
    updated_range_re()
        .captures(updated_range)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
