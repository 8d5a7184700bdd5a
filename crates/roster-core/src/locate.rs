use crate::note;

/// One cell of the identity column (column A) with its note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityCell {
    /// 1-based sheet row.
    pub row: u32,
    /// Visible text, trimmed.
    pub value: String,
    /// Note text, trimmed.
    pub note: String,
}

impl IdentityCell {
    pub fn new(row: u32, value: impl AsRef<str>, note: impl AsRef<str>) -> Self {
        Self {
            row,
            value: value.as_ref().trim().to_string(),
            note: note.as_ref().trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    DiscordId,
    DisplayName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub row: u32,
    pub matched_by: MatchedBy,
}

/// Find the row owned by a member.
///
/// The `Discord ID` recorded in a note always wins. Only when no note carries
/// the id is the column scanned again for an exact, case-sensitive match on
/// the visible display name.
pub fn locate(cells: &[IdentityCell], discord_id: &str, display_name: &str) -> Option<Located> {
    let by_id = cells.iter().find(|c| {
        note::discord_id(&c.note)
            .map(|id| id == discord_id)
            .unwrap_or(false)
    });
    if let Some(cell) = by_id {
        return Some(Located {
            row: cell.row,
            matched_by: MatchedBy::DiscordId,
        });
    }

    cells
        .iter()
        .find(|c| !c.value.is_empty() && c.value == display_name)
        .map(|cell| Located {
            row: cell.row,
            matched_by: MatchedBy::DisplayName,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> Vec<IdentityCell> {
        vec![
            IdentityCell::new(1, "Member", ""),
            IdentityCell::new(2, "Aelith", "Discord ID: 111"),
            IdentityCell::new(3, "Borin", ""),
            IdentityCell::new(4, "OldNick", "Discord ID: 123\nJoined: 2021"),
            IdentityCell::new(5, "", ""),
        ]
    }

    #[test]
    fn id_wins_over_name() {
        let found = locate(&column(), "123", "Borin").unwrap();
        assert_eq!(found.row, 4);
        assert_eq!(found.matched_by, MatchedBy::DiscordId);
    }

    #[test]
    fn falls_back_to_display_name() {
        let found = locate(&column(), "999", "Borin").unwrap();
        assert_eq!(found.row, 3);
        assert_eq!(found.matched_by, MatchedBy::DisplayName);
    }

    #[test]
    fn name_match_is_case_sensitive() {
        assert!(locate(&column(), "999", "borin").is_none());
    }

    #[test]
    fn empty_display_name_never_matches_blank_rows() {
        assert!(locate(&column(), "999", "").is_none());
    }

    #[test]
    fn not_found() {
        assert!(locate(&[], "1", "x").is_none());
    }
}
