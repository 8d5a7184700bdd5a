use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Requests ─────────────────────────────────────────────────────────────

/// How written values are interpreted by Sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Stored verbatim as text.
    Raw,
    /// Parsed as if typed into the UI (numbers, dates, formulas).
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn new(range: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            range: Some(range.into()),
            values: rows
                .into_iter()
                .map(|row| row.into_iter().map(Value::String).collect())
                .collect(),
        }
    }

    /// Cells rendered as text; numbers and booleans are stringified.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.values
            .iter()
            .map(|row| row.iter().map(value_text).collect())
            .collect()
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchUpdateValuesRequest {
    pub value_input_option: ValueInputOption,
    pub data: Vec<ValueRange>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchUpdateRequest {
    pub requests: Vec<Value>,
}

// ─── Responses ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Sheet {
    pub properties: Option<SheetProperties>,
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GridData {
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CellData {
    pub formatted_value: Option<String>,
    pub note: Option<String>,
}

/// Visible text and note of one grid cell; both empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridCell {
    pub value: String,
    pub note: String,
}

impl From<CellData> for GridCell {
    fn from(cell: CellData) -> Self {
        Self {
            value: cell.formatted_value.unwrap_or_default(),
            note: cell.note.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct AppendValuesResponse {
    pub updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateValuesResponse {
    pub updated_range: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DriveFile {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_cells_default_to_empty() {
        let cell: CellData = serde_json::from_str(r#"{"note":"discord_id: 1"}"#).unwrap();
        assert_eq!(
            GridCell::from(cell),
            GridCell {
                value: String::new(),
                note: "discord_id: 1".into()
            }
        );
    }

    #[test]
    fn numeric_values_render_as_text() {
        let vr: ValueRange =
            serde_json::from_str(r#"{"range":"Roster!A1:B1","values":[["Bob",60]]}"#).unwrap();
        assert_eq!(vr.text_rows(), vec![vec!["Bob".to_string(), "60".to_string()]]);
    }

    #[test]
    fn input_option_wire_names() {
        assert_eq!(
            serde_json::to_string(&ValueInputOption::UserEntered).unwrap(),
            "\"USER_ENTERED\""
        );
        assert_eq!(ValueInputOption::Raw.as_str(), "RAW");
    }
}
