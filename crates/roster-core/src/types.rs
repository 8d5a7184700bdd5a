use std::fmt;

// ---------------------------------------------------------------------------
// CharacterClass
// ---------------------------------------------------------------------------

/// The fifteen playable classes. Declaration order is the column order of the
/// `Roster` sheet: `Bard` lives in column D, `Beastlord` in column R.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharacterClass {
    Bard,
    Cleric,
    Druid,
    Enchanter,
    Magician,
    Monk,
    Necromancer,
    Paladin,
    Ranger,
    Rogue,
    ShadowKnight,
    Shaman,
    Warrior,
    Wizard,
    Beastlord,
}

/// 1-based column of the first class cell (column D).
pub const FIRST_CLASS_COLUMN: u32 = 4;

impl CharacterClass {
    pub fn all() -> &'static [CharacterClass] {
        &[
            CharacterClass::Bard,
            CharacterClass::Cleric,
            CharacterClass::Druid,
            CharacterClass::Enchanter,
            CharacterClass::Magician,
            CharacterClass::Monk,
            CharacterClass::Necromancer,
            CharacterClass::Paladin,
            CharacterClass::Ranger,
            CharacterClass::Rogue,
            CharacterClass::ShadowKnight,
            CharacterClass::Shaman,
            CharacterClass::Warrior,
            CharacterClass::Wizard,
            CharacterClass::Beastlord,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based sheet column holding this class.
    pub fn column(self) -> u32 {
        FIRST_CLASS_COLUMN + self.index() as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CharacterClass::Bard => "Bard",
            CharacterClass::Cleric => "Cleric",
            CharacterClass::Druid => "Druid",
            CharacterClass::Enchanter => "Enchanter",
            CharacterClass::Magician => "Magician",
            CharacterClass::Monk => "Monk",
            CharacterClass::Necromancer => "Necromancer",
            CharacterClass::Paladin => "Paladin",
            CharacterClass::Ranger => "Ranger",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::ShadowKnight => "Shadow Knight",
            CharacterClass::Shaman => "Shaman",
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Wizard => "Wizard",
            CharacterClass::Beastlord => "Beastlord",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CharacterClass {
    type Err = crate::error::RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharacterClass::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| crate::error::RosterError::UnknownClass(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// The invoking guild member as the roster sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub discord_id: String,
    /// Current guild display name, falling back to the username.
    pub display_name: String,
}

impl Member {
    pub fn new(discord_id: impl Into<String>, display_name: impl AsRef<str>) -> Self {
        Self {
            discord_id: discord_id.into(),
            display_name: display_name.as_ref().trim().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// UpsertMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// `/roster add`: creates the row when missing, never carries a tag.
    Add,
    /// `/roster edit`: requires an existing row, preserves the tag.
    Edit,
}

impl UpsertMode {
    pub fn as_str(self) -> &'static str {
        match self {
            UpsertMode::Add => "add",
            UpsertMode::Edit => "edit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_classes_span_d_to_r() {
        assert_eq!(CharacterClass::all().len(), 15);
        assert_eq!(CharacterClass::Bard.column(), 4);
        assert_eq!(CharacterClass::Beastlord.column(), 18);
    }

    #[test]
    fn parse_is_exact_and_case_sensitive() {
        assert_eq!(
            "Shadow Knight".parse::<CharacterClass>().unwrap(),
            CharacterClass::ShadowKnight
        );
        assert!("shadow knight".parse::<CharacterClass>().is_err());
        assert!("Bersker".parse::<CharacterClass>().is_err());
    }

    #[test]
    fn member_trims_display_name() {
        let m = Member::new("42", "  Aelith ");
        assert_eq!(m.display_name, "Aelith");
    }
}
