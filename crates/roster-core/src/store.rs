use async_trait::async_trait;

use crate::a1::CellRef;
use crate::error::Result;
use crate::locate::IdentityCell;

/// Everything the roster needs from the spreadsheet backend.
///
/// Each call is one backend round trip with no transaction around them, so
/// read-modify-write sequences (note merges) are last-write-wins.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Column A of the `Roster` sheet, top to bottom, with notes.
    async fn identity_column(&self) -> Result<Vec<IdentityCell>>;

    /// Append a row whose column A holds `display_name`; returns its row.
    async fn append_row(&self, display_name: &str) -> Result<u32>;

    /// Visible text of one cell, empty when blank.
    async fn cell_value(&self, cell: CellRef) -> Result<String>;

    async fn set_cell_value(&self, cell: CellRef, value: &str) -> Result<()>;

    /// Note of one cell, empty when absent.
    async fn cell_note(&self, cell: CellRef) -> Result<String>;

    async fn set_cell_note(&self, cell: CellRef, note: &str) -> Result<()>;

    /// Visible text of the fifteen class cells of `row` (columns D..R).
    /// Trailing blank cells may be omitted.
    async fn class_cells(&self, row: u32) -> Result<Vec<String>>;

    /// Blank every listed cell in one batched write.
    async fn clear_cells(&self, cells: &[CellRef]) -> Result<()>;

    /// Create `sheet` if needed, clear it and write `rows` from A1 as raw text.
    async fn replace_sheet(&self, sheet: &str, rows: Vec<Vec<String>>) -> Result<()>;
}
