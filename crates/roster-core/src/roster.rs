//! `/roster add|edit|remove` pipelines over a [`RosterStore`].

use async_trait::async_trait;

use crate::a1::CellRef;
use crate::access::AccessOutcome;
use crate::cell;
use crate::error::{Result, RosterError};
use crate::locate::{self, MatchedBy};
use crate::note::{self, AA_KEY, ACCESS_KEY, DISCORD_ID_KEY};
use crate::store::RosterStore;
use crate::types::{CharacterClass, Member, UpsertMode, FIRST_CLASS_COLUMN};

/// Source of the access selection for a class cell, run between writing the
/// cell text and writing its note.
#[async_trait]
pub trait AccessPicker: Send {
    async fn pick(&mut self, preselected: Vec<String>) -> Result<AccessOutcome>;
}

/// Options of `/roster add` and `/roster edit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterUpdate {
    pub name: String,
    /// Raw class option; validated against [`CharacterClass`].
    pub class: String,
    pub level: u32,
    pub aa: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertSummary {
    pub mode: UpsertMode,
    pub row: u32,
    pub class: CharacterClass,
    pub cell_text: String,
    pub aa: Option<u32>,
    pub access: Vec<String>,
}

impl UpsertSummary {
    pub fn reply(&self) -> String {
        let verb = match self.mode {
            UpsertMode::Add => "Saved",
            UpsertMode::Edit => "Updated",
        };
        let mut out = format!("{verb} • {}: `{}`", self.class, self.cell_text);
        if let Some(aa) = self.aa {
            out.push_str(&format!(" • AA={aa}"));
        }
        if !self.access.is_empty() {
            out.push_str(&format!(" • Access=[{}]", self.access.join(", ")));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveSummary {
    pub name: String,
    pub removed: usize,
}

impl RemoveSummary {
    pub fn reply(&self) -> String {
        match self.removed {
            0 => format!("Nothing to remove for **{}**.", self.name),
            1 => format!("Removed **{}** from your row.", self.name),
            n => format!("Removed **{}** from your row ({n} cells).", self.name),
        }
    }
}

/// Reply shown when the member has no row yet.
pub fn no_row_reply(suggest_add: bool) -> &'static str {
    if suggest_add {
        "No row found. Use `/roster add`."
    } else {
        "No row found."
    }
}

/// Row of `member`, or `None`.
pub async fn find_row<S: RosterStore + ?Sized>(store: &S, member: &Member) -> Result<Option<u32>> {
    let column = store.identity_column().await?;
    let found = locate::locate(&column, &member.discord_id, &member.display_name);
    if let Some(found) = found {
        tracing::debug!(
            row = found.row,
            by_name = found.matched_by == MatchedBy::DisplayName,
            "located roster row"
        );
    }
    Ok(found.map(|f| f.row))
}

/// Record the member's id in the column A note and refresh the visible
/// display name.
pub async fn stamp_identity<S: RosterStore + ?Sized>(store: &S, row: u32, member: &Member) -> Result<()> {
    let cell = CellRef::identity(row);
    let existing = store.cell_note(cell).await?;
    let merged = note::merge_note(&existing, [(DISCORD_ID_KEY, member.discord_id.as_str())]);
    store.set_cell_note(cell, &merged).await?;
    store.set_cell_value(cell, &member.display_name).await
}

/// Run `/roster add` or `/roster edit` for `member`.
pub async fn upsert_character<S, P>(
    store: &S,
    member: &Member,
    update: &CharacterUpdate,
    mode: UpsertMode,
    picker: &mut P,
) -> Result<UpsertSummary>
where
    S: RosterStore + ?Sized,
    P: AccessPicker + ?Sized,
{
    let row = match (find_row(store, member).await?, mode) {
        (Some(row), _) => row,
        (None, UpsertMode::Add) => {
            let row = store.append_row(&member.display_name).await?;
            tracing::info!(row, member = %member.discord_id, "appended roster row");
            row
        }
        (None, UpsertMode::Edit) => return Err(RosterError::NoRow),
    };

    stamp_identity(store, row, member).await?;

    let class: CharacterClass = update.class.parse()?;
    let cell = CellRef::new(row, class.column());

    let current = match mode {
        UpsertMode::Edit => Some(store.cell_value(cell).await?),
        UpsertMode::Add => None,
    };
    let cell_text = cell::rebuild(current.as_deref(), &update.name, update.level);
    store.set_cell_value(cell, &cell_text).await?;

    let old_note = store.cell_note(cell).await?;
    let preselected = match mode {
        UpsertMode::Edit => note::access_labels(&old_note),
        UpsertMode::Add => Vec::new(),
    };
    let access = picker.pick(preselected).await?.into_labels();

    let aa_text = update.aa.map(|aa| aa.to_string()).unwrap_or_default();
    let access_text = access.join(", ");
    let new_note = note::merge_note(&old_note, [(AA_KEY, aa_text), (ACCESS_KEY, access_text)]);
    store.set_cell_note(cell, &new_note).await?;

    tracing::info!(row, class = %class, mode = mode.as_str(), "class cell written");

    Ok(UpsertSummary {
        mode,
        row,
        class,
        cell_text,
        aa: update.aa,
        access,
    })
}

/// Run `/roster remove`: blank every class cell holding `name`.
pub async fn remove_character<S: RosterStore + ?Sized>(
    store: &S,
    member: &Member,
    name: &str,
) -> Result<RemoveSummary> {
    let row = find_row(store, member).await?.ok_or(RosterError::NoRow)?;
    stamp_identity(store, row, member).await?;

    let cells: Vec<CellRef> = store
        .class_cells(row)
        .await?
        .iter()
        .take(CharacterClass::all().len())
        .enumerate()
        .filter(|(_, text)| cell::holds_character(text, name))
        .map(|(i, _)| CellRef::new(row, FIRST_CLASS_COLUMN + i as u32))
        .collect();

    if !cells.is_empty() {
        store.clear_cells(&cells).await?;
        tracing::info!(row, removed = cells.len(), "class cells cleared");
    }

    Ok(RemoveSummary {
        name: name.to_string(),
        removed: cells.len(),
    })
}
