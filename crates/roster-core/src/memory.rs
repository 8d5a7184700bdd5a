//! In-process [`RosterStore`] backing the orchestration tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::a1::CellRef;
use crate::error::Result;
use crate::locate::IdentityCell;
use crate::store::RosterStore;
use crate::types::FIRST_CLASS_COLUMN;

#[derive(Debug, Default)]
struct Grid {
    values: BTreeMap<(u32, u32), String>,
    notes: BTreeMap<(u32, u32), String>,
    sheets: HashMap<String, Vec<Vec<String>>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    grid: Mutex<Grid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a cell's visible text.
    pub fn with_value(self, cell: CellRef, value: &str) -> Self {
        self.lock().values.insert((cell.row, cell.column), value.to_string());
        self
    }

    /// Seed a cell's note.
    pub fn with_note(self, cell: CellRef, note: &str) -> Self {
        self.lock().notes.insert((cell.row, cell.column), note.to_string());
        self
    }

    pub fn value(&self, cell: CellRef) -> String {
        self.lock()
            .values
            .get(&(cell.row, cell.column))
            .cloned()
            .unwrap_or_default()
    }

    pub fn note(&self, cell: CellRef) -> String {
        self.lock()
            .notes
            .get(&(cell.row, cell.column))
            .cloned()
            .unwrap_or_default()
    }

    pub fn sheet(&self, name: &str) -> Option<Vec<Vec<String>>> {
        self.lock().sheets.get(name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Grid> {
        self.grid.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn last_row(grid: &Grid) -> u32 {
        grid.values
            .keys()
            .chain(grid.notes.keys())
            .filter(|(_, col)| *col == 1)
            .map(|(row, _)| *row)
            .max()
            .unwrap_or(0)
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn identity_column(&self) -> Result<Vec<IdentityCell>> {
        let grid = self.lock();
        let last = Self::last_row(&grid);
        Ok((1..=last)
            .map(|row| {
                IdentityCell::new(
                    row,
                    grid.values.get(&(row, 1)).map(String::as_str).unwrap_or(""),
                    grid.notes.get(&(row, 1)).map(String::as_str).unwrap_or(""),
                )
            })
            .collect())
    }

    async fn append_row(&self, display_name: &str) -> Result<u32> {
        let mut grid = self.lock();
        let row = Self::last_row(&grid) + 1;
        grid.values.insert((row, 1), display_name.to_string());
        Ok(row)
    }

    async fn cell_value(&self, cell: CellRef) -> Result<String> {
        Ok(self.value(cell))
    }

    async fn set_cell_value(&self, cell: CellRef, value: &str) -> Result<()> {
        self.lock()
            .values
            .insert((cell.row, cell.column), value.to_string());
        Ok(())
    }

    async fn cell_note(&self, cell: CellRef) -> Result<String> {
        Ok(self.note(cell))
    }

    async fn set_cell_note(&self, cell: CellRef, note: &str) -> Result<()> {
        self.lock()
            .notes
            .insert((cell.row, cell.column), note.to_string());
        Ok(())
    }

    async fn class_cells(&self, row: u32) -> Result<Vec<String>> {
        let grid = self.lock();
        Ok((0..15)
            .map(|i| {
                grid.values
                    .get(&(row, FIRST_CLASS_COLUMN + i))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect())
    }

    async fn clear_cells(&self, cells: &[CellRef]) -> Result<()> {
        let mut grid = self.lock();
        for cell in cells {
            grid.values.insert((cell.row, cell.column), String::new());
        }
        Ok(())
    }

    async fn replace_sheet(&self, sheet: &str, rows: Vec<Vec<String>>) -> Result<()> {
        self.lock().sheets.insert(sheet.to_string(), rows);
        Ok(())
    }
}
