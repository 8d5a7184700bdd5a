use async_trait::async_trait;
use google_client::sheets::SheetsClient;
use google_client::types::ValueRange;
use google_client::ValueInputOption;
use roster_core::a1::{self, column_letter, quoted_sheet, CellRef, ROSTER_SHEET};
use roster_core::locate::IdentityCell;
use roster_core::store::RosterStore;
use roster_core::types::{CharacterClass, FIRST_CLASS_COLUMN};
use roster_core::{Result, RosterError};
use tokio::sync::OnceCell;

use super::backend_error;

/// [`RosterStore`] over the `Roster` sheet of one spreadsheet.
pub struct SheetsRosterStore {
    sheets: SheetsClient,
    roster_sheet_id: OnceCell<i64>,
}

impl SheetsRosterStore {
    pub fn new(sheets: SheetsClient) -> Self {
        Self {
            sheets,
            roster_sheet_id: OnceCell::new(),
        }
    }

    /// Numeric id of `Roster`, looked up once per process.
    async fn roster_sheet_id(&self) -> Result<i64> {
        self.roster_sheet_id
            .get_or_try_init(|| async {
                let id = self
                    .sheets
                    .sheet_id(ROSTER_SHEET)
                    .await
                    .map_err(backend_error)?;
                tracing::debug!(sheet_id = id, "resolved roster sheet id");
                Ok::<i64, RosterError>(id)
            })
            .await
            .copied()
    }

    fn class_span(row: u32) -> String {
        let last = FIRST_CLASS_COLUMN + CharacterClass::all().len() as u32 - 1;
        format!(
            "{ROSTER_SHEET}!{}{row}:{}{row}",
            column_letter(FIRST_CLASS_COLUMN),
            column_letter(last)
        )
    }
}

#[async_trait]
impl RosterStore for SheetsRosterStore {
    async fn identity_column(&self) -> Result<Vec<IdentityCell>> {
        let rows = self
            .sheets
            .grid(&format!("{ROSTER_SHEET}!A1:A"))
            .await
            .map_err(backend_error)?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let cell = row.into_iter().next().unwrap_or_default();
                IdentityCell::new(i as u32 + 1, cell.value, cell.note)
            })
            .collect())
    }

    async fn append_row(&self, display_name: &str) -> Result<u32> {
        let updated = self
            .sheets
            .append_values(
                &format!("{ROSTER_SHEET}!A:A"),
                vec![vec![display_name.to_string()]],
                ValueInputOption::UserEntered,
            )
            .await
            .map_err(backend_error)?;
        if let Some(row) = updated.as_deref().and_then(a1::row_from_updated_range) {
            return Ok(row);
        }

        tracing::warn!(updated_range = ?updated, "append returned no usable range, rescanning");
        self.identity_column()
            .await?
            .iter()
            .rev()
            .find(|cell| cell.value == display_name.trim())
            .map(|cell| cell.row)
            .ok_or_else(|| RosterError::Backend("appended row could not be located".into()))
    }

    async fn cell_value(&self, cell: CellRef) -> Result<String> {
        let rows = self
            .sheets
            .get_values(&cell.a1())
            .await
            .map_err(backend_error)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default())
    }

    async fn set_cell_value(&self, cell: CellRef, value: &str) -> Result<()> {
        self.sheets
            .update_values(
                &cell.a1(),
                vec![vec![value.to_string()]],
                ValueInputOption::UserEntered,
            )
            .await
            .map_err(backend_error)
    }

    async fn cell_note(&self, cell: CellRef) -> Result<String> {
        let rows = self
            .sheets
            .grid(&cell.a1_span())
            .await
            .map_err(backend_error)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .map(|c| c.note)
            .unwrap_or_default())
    }

    async fn set_cell_note(&self, cell: CellRef, note: &str) -> Result<()> {
        let sheet_id = self.roster_sheet_id().await?;
        self.sheets
            .set_note(sheet_id, cell.row_index(), cell.column_index(), note)
            .await
            .map_err(backend_error)
    }

    async fn class_cells(&self, row: u32) -> Result<Vec<String>> {
        let rows = self
            .sheets
            .get_values(&Self::class_span(row))
            .await
            .map_err(backend_error)?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn clear_cells(&self, cells: &[CellRef]) -> Result<()> {
        let data = cells
            .iter()
            .map(|cell| ValueRange::new(cell.a1(), vec![vec![String::new()]]))
            .collect();
        self.sheets
            .batch_update_values(data, ValueInputOption::UserEntered)
            .await
            .map_err(backend_error)
    }

    async fn replace_sheet(&self, sheet: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let prefix = quoted_sheet(sheet);
        self.sheets.ensure_sheet(sheet).await.map_err(backend_error)?;
        self.sheets
            .clear_values(&format!("{prefix}A:Z"))
            .await
            .map_err(backend_error)?;
        self.sheets
            .update_values(&format!("{prefix}A1"), rows, ValueInputOption::Raw)
            .await
            .map_err(backend_error)
    }
}
