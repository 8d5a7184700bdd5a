use reqwest::{Method, RequestBuilder, Url};
use serde_json::json;
use std::sync::Arc;

use crate::auth::TokenSource;
use crate::error::{GoogleError, Result};
use crate::types::{
    AppendValuesResponse, BatchUpdateRequest, BatchUpdateValuesRequest, GridCell, SheetProperties,
    Spreadsheet, ValueInputOption, ValueRange,
};

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// One spreadsheet, addressed by id.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    auth: Arc<dyn TokenSource>,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: impl Into<String>, auth: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: SHEETS_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            auth,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    // ─── Sheets ───────────────────────────────────────────────────────────

    pub async fn sheet_properties(&self) -> Result<Vec<SheetProperties>> {
        let url = self.url(&[])?;
        let spreadsheet: Spreadsheet = self
            .send(
                self.request(Method::GET, url)
                    .query(&[("fields", "sheets.properties(sheetId,title)")]),
            )
            .await?
            .json()
            .await?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .filter_map(|s| s.properties)
            .collect())
    }

    /// Numeric id of the sheet titled `title`.
    pub async fn sheet_id(&self, title: &str) -> Result<i64> {
        self.sheet_properties()
            .await?
            .into_iter()
            .find(|p| p.title == title)
            .map(|p| p.sheet_id)
            .ok_or_else(|| GoogleError::SheetNotFound(title.to_string()))
    }

    pub async fn add_sheet(&self, title: &str) -> Result<()> {
        self.batch_update(vec![json!({ "addSheet": { "properties": { "title": title } } })])
            .await
    }

    /// Add `title` unless a sheet by that name already exists.
    pub async fn ensure_sheet(&self, title: &str) -> Result<()> {
        if self.sheet_properties().await?.iter().any(|p| p.title == title) {
            return Ok(());
        }
        tracing::info!(sheet = title, "creating sheet");
        self.add_sheet(title).await
    }

    /// Cells of `range` with their visible text and notes, row-major.
    /// Trailing empty rows and cells may be missing.
    pub async fn grid(&self, range: &str) -> Result<Vec<Vec<GridCell>>> {
        let url = self.url(&[])?;
        let spreadsheet: Spreadsheet = self
            .send(self.request(Method::GET, url).query(&[
                ("ranges", range),
                ("includeGridData", "true"),
                ("fields", "sheets.data.rowData.values(formattedValue,note)"),
            ]))
            .await?
            .json()
            .await?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .flat_map(|s| s.data)
            .flat_map(|d| d.row_data)
            .map(|row| row.values.into_iter().map(GridCell::from).collect())
            .collect())
    }

    /// Overwrite the note of a single cell; indices are zero-based.
    pub async fn set_note(
        &self,
        sheet_id: i64,
        row_index: u32,
        column_index: u32,
        note: &str,
    ) -> Result<()> {
        self.batch_update(vec![json!({
            "updateCells": {
                "start": {
                    "sheetId": sheet_id,
                    "rowIndex": row_index,
                    "columnIndex": column_index,
                },
                "rows": [{ "values": [{ "note": note }] }],
                "fields": "note",
            }
        })])
        .await
    }

    async fn batch_update(&self, requests: Vec<serde_json::Value>) -> Result<()> {
        let url = self.url_with_suffix(":batchUpdate", &[])?;
        self.send(
            self.request(Method::POST, url)
                .json(&BatchUpdateRequest { requests }),
        )
        .await?;
        Ok(())
    }

    // ─── Values ───────────────────────────────────────────────────────────

    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.url(&["values", range])?;
        let body: ValueRange = self
            .send(self.request(Method::GET, url))
            .await?
            .json()
            .await?;
        Ok(body.text_rows())
    }

    pub async fn update_values(
        &self,
        range: &str,
        rows: Vec<Vec<String>>,
        input: ValueInputOption,
    ) -> Result<()> {
        let url = self.url(&["values", range])?;
        self.send(
            self.request(Method::PUT, url)
                .query(&[("valueInputOption", input.as_str())])
                .json(&ValueRange::new(range, rows)),
        )
        .await?;
        Ok(())
    }

    /// Append rows after the table in `range`; returns the `updatedRange`
    /// reported by Sheets, if any.
    pub async fn append_values(
        &self,
        range: &str,
        rows: Vec<Vec<String>>,
        input: ValueInputOption,
    ) -> Result<Option<String>> {
        let url = self.url(&["values", &format!("{range}:append")])?;
        let body: AppendValuesResponse = self
            .send(
                self.request(Method::POST, url)
                    .query(&[
                        ("valueInputOption", input.as_str()),
                        ("insertDataOption", "INSERT_ROWS"),
                    ])
                    .json(&ValueRange::new(range, rows)),
            )
            .await?
            .json()
            .await?;
        Ok(body.updates.and_then(|u| u.updated_range))
    }

    pub async fn clear_values(&self, range: &str) -> Result<()> {
        let url = self.url(&["values", &format!("{range}:clear")])?;
        self.send(self.request(Method::POST, url).json(&json!({})))
            .await?;
        Ok(())
    }

    /// Write several ranges in one request.
    pub async fn batch_update_values(
        &self,
        data: Vec<ValueRange>,
        input: ValueInputOption,
    ) -> Result<()> {
        let url = self.url_with_suffix("/values:batchUpdate", &[])?;
        self.send(
            self.request(Method::POST, url)
                .json(&BatchUpdateValuesRequest {
                    value_input_option: input,
                    data,
                }),
        )
        .await?;
        Ok(())
    }

    // ─── Internal ─────────────────────────────────────────────────────────

    fn url(&self, segments: &[&str]) -> Result<Url> {
        self.url_with_suffix("", segments)
    }

    /// `{base}/v4/spreadsheets/{id}{suffix}/{segments..}`; segments are
    /// percent-encoded, the suffix is appended to the id verbatim.
    fn url_with_suffix(&self, suffix: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GoogleError::Unexpected(format!("invalid base url: {e}")))?;
        let (id_segment, rest) = match suffix.split_once('/') {
            Some((head, tail)) => (format!("{}{head}", self.spreadsheet_id), Some(tail)),
            None => (format!("{}{suffix}", self.spreadsheet_id), None),
        };
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GoogleError::Unexpected("base url cannot hold a path".into()))?;
            path.pop_if_empty().extend(["v4", "spreadsheets", id_segment.as_str()]);
            if let Some(rest) = rest {
                path.push(rest);
            }
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        crate::check(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> SheetsClient {
        SheetsClient::new("sheet-1", Arc::new(StaticToken("tok".into())))
            .with_base_url(server.url())
    }

    #[test]
    fn urls_place_suffixes_and_segments() {
        let c = SheetsClient::new("abc", Arc::new(StaticToken("t".into())))
            .with_base_url("https://sheets.example");
        assert_eq!(
            c.url(&["values", "Roster!D7:D7"]).unwrap().as_str(),
            "https://sheets.example/v4/spreadsheets/abc/values/Roster!D7:D7"
        );
        assert_eq!(
            c.url_with_suffix(":batchUpdate", &[]).unwrap().as_str(),
            "https://sheets.example/v4/spreadsheets/abc:batchUpdate"
        );
        assert_eq!(
            c.url_with_suffix("/values:batchUpdate", &[]).unwrap().as_str(),
            "https://sheets.example/v4/spreadsheets/abc/values:batchUpdate"
        );
        assert_eq!(
            c.url(&["values", "'Raw Discord Data'!A1"]).unwrap().path(),
            "/v4/spreadsheets/abc/values/'Raw%20Discord%20Data'!A1"
        );
    }

    #[tokio::test]
    async fn sheet_id_by_title() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v4/spreadsheets/sheet-1")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(
                r#"{"sheets":[{"properties":{"sheetId":0,"title":"Summary"}},
                              {"properties":{"sheetId":42,"title":"Roster"}}]}"#,
            )
            .create_async()
            .await;

        let c = client(&server);
        assert_eq!(c.sheet_id("Roster").await.unwrap(), 42);
        assert!(matches!(
            c.sheet_id("Missing").await.unwrap_err(),
            GoogleError::SheetNotFound(ref t) if t == "Missing"
        ));
    }

    #[tokio::test]
    async fn grid_reads_values_and_notes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v4/spreadsheets/sheet-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ranges".into(), "Roster!A1:A".into()),
                Matcher::UrlEncoded("includeGridData".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"sheets":[{"data":[{"rowData":[
                    {"values":[{"formattedValue":"Name"}]},
                    {},
                    {"values":[{"formattedValue":"Bob","note":"discord_id: 7"}]}
                ]}]}]}"#,
            )
            .create_async()
            .await;

        let rows = client(&server).grid("Roster!A1:A").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0].value, "Name");
        assert!(rows[1].is_empty());
        assert_eq!(rows[2][0].note, "discord_id: 7");
    }

    #[tokio::test]
    async fn append_returns_updated_range() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v4/spreadsheets/sheet-1/values/Roster!A:A:append")
            .match_query(Matcher::UrlEncoded(
                "valueInputOption".into(),
                "USER_ENTERED".into(),
            ))
            .match_body(Matcher::PartialJson(
                serde_json::json!({ "values": [["Bob"]] }),
            ))
            .with_status(200)
            .with_body(r#"{"updates":{"updatedRange":"Roster!A12:A12","updatedRows":1}}"#)
            .create_async()
            .await;

        let range = client(&server)
            .append_values("Roster!A:A", vec![vec!["Bob".into()]], ValueInputOption::UserEntered)
            .await
            .unwrap();
        assert_eq!(range.as_deref(), Some("Roster!A12:A12"));
    }

    #[tokio::test]
    async fn set_note_sends_update_cells() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v4/spreadsheets/sheet-1:batchUpdate")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "requests": [{ "updateCells": {
                    "start": { "sheetId": 42, "rowIndex": 6, "columnIndex": 3 },
                    "rows": [{ "values": [{ "note": "AA: 250" }] }],
                    "fields": "note"
                }}]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(&server).set_note(42, 6, 3, "AA: 250").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn batch_update_values_posts_all_ranges() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v4/spreadsheets/sheet-1/values:batchUpdate")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "valueInputOption": "USER_ENTERED",
                "data": [
                    { "range": "Roster!D7:D7", "values": [[""]] },
                    { "range": "Roster!F7:F7", "values": [[""]] }
                ]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(&server)
            .batch_update_values(
                vec![
                    ValueRange::new("Roster!D7:D7", vec![vec![String::new()]]),
                    ValueRange::new("Roster!F7:F7", vec![vec![String::new()]]),
                ],
                ValueInputOption::UserEntered,
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v4/spreadsheets/sheet-1/values/Roster!D7:D7")
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let err = client(&server).get_values("Roster!D7:D7").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "HTTP 403: The caller does not have permission");
    }
}
