// crates/connectors/src/sheets/http.rs
//! Sheets v4 REST connector

use super::{column_letter, TabularConnector};
use crate::error::{ConnectorError, ConnectorResult};
use crate::http::HttpClient;
use log::info;
use serde_json::{json, Value};
use sheetbridge_core::RemoteError;

/// Default Sheets API endpoint
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// One worksheet of a spreadsheet, addressed by title
#[derive(Debug, Clone)]
pub struct SheetsConnector {
    http: HttpClient,
    base_url: String,
    token: String,
    spreadsheet_id: String,
    worksheet: String,
}

impl SheetsConnector {
    /// Creates a connector authenticated with an OAuth bearer token
    pub fn new(
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
        token: impl Into<String>,
    ) -> ConnectorResult<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            base_url: SHEETS_API_BASE.to_string(),
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
        })
    }

    /// Points the connector at a different API base
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns a connector for another worksheet of the same spreadsheet
    pub fn for_worksheet(&self, worksheet: impl Into<String>) -> Self {
        Self {
            worksheet: worksheet.into(),
            ..self.clone()
        }
    }

    /// Worksheet title
    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    fn range(&self, cells: &str) -> String {
        a1_range(&self.worksheet, cells)
    }

    fn get(&self, url: &str) -> ConnectorResult<Value> {
        let request = self.http.inner().get(url).bearer_auth(&self.token);
        self.http.send_json(request)
    }

    fn post(&self, url: &str, body: &Value) -> ConnectorResult<Value> {
        let request = self.http.inner().post(url).bearer_auth(&self.token).json(body);
        self.http.send_json(request)
    }

    fn put(&self, url: &str, body: &Value) -> ConnectorResult<Value> {
        let request = self.http.inner().put(url).bearer_auth(&self.token).json(body);
        self.http.send_json(request)
    }

    fn worksheet_properties(&self) -> ConnectorResult<Value> {
        let url = format!(
            "{}?fields={}",
            self.spreadsheet_url(),
            urlencoding::encode("sheets.properties(title,gridProperties.rowCount)")
        );
        self.get(&url)
    }
}

impl TabularConnector for SheetsConnector {
    fn resolve(&self) -> Result<(), RemoteError> {
        let body = self.worksheet_properties()?;
        if find_worksheet(&body, &self.worksheet).is_some() {
            return Ok(());
        }

        info!("Creating worksheet {:?}", self.worksheet);
        let url = format!("{}:batchUpdate", self.spreadsheet_url());
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": self.worksheet } } }]
        });
        self.post(&url, &body)?;
        Ok(())
    }

    fn header(&self) -> Result<Vec<String>, RemoteError> {
        let body = self.get(&self.values_url(&self.range("1:1")))?;
        Ok(parse_values(&body).into_iter().next().unwrap_or_default())
    }

    fn write_header(&self, header: &[String]) -> Result<(), RemoteError> {
        let url = format!(
            "{}?valueInputOption=RAW",
            self.values_url(&self.range("A1"))
        );
        self.put(&url, &json!({ "values": [header] }))?;
        Ok(())
    }

    fn row_count(&self) -> Result<usize, RemoteError> {
        let body = self.worksheet_properties()?;
        let properties = find_worksheet(&body, &self.worksheet).ok_or_else(|| {
            RemoteError::Permanent(format!("worksheet {:?} not found", self.worksheet))
        })?;
        Ok(properties["gridProperties"]["rowCount"]
            .as_u64()
            .map_or(0, |rows| rows as usize))
    }

    fn read_rows(&self, start: usize, count: usize) -> Result<Vec<Vec<String>>, RemoteError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let cells = format!("{}:{}", start, start + count - 1);
        let body = self.get(&self.values_url(&self.range(&cells)))?;
        Ok(parse_values(&body))
    }

    fn write_cells(&self, row: usize, cells: &[(usize, String)]) -> Result<(), RemoteError> {
        if cells.is_empty() {
            return Ok(());
        }
        let data: Vec<Value> = cells
            .iter()
            .map(|(col, text)| {
                json!({
                    "range": self.range(&format!("{}{}", column_letter(*col), row)),
                    "values": [[text]],
                })
            })
            .collect();

        let url = format!("{}/values:batchUpdate", self.spreadsheet_url());
        let body = json!({ "valueInputOption": "USER_ENTERED", "data": data });
        self.post(&url, &body)?;
        Ok(())
    }

    fn append_row(&self, values: &[String]) -> Result<usize, RemoteError> {
        let url = format!(
            "{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.values_url(&self.range("A1"))
        );
        let body = self.post(&url, &json!({ "values": [values] }))?;
        let updated = body["updates"]["updatedRange"].as_str().unwrap_or_default();
        first_row_of_range(updated).ok_or_else(|| {
            RemoteError::from(ConnectorError::Parse(format!(
                "append returned no row range: {:?}",
                updated
            )))
        })
    }
}

/// Quotes a worksheet title into an A1 range
fn a1_range(worksheet: &str, cells: &str) -> String {
    format!("'{}'!{}", worksheet.replace('\'', "''"), cells)
}

/// Properties of the worksheet with the given title
fn find_worksheet<'a>(body: &'a Value, title: &str) -> Option<&'a Value> {
    body["sheets"]
        .as_array()?
        .iter()
        .map(|sheet| &sheet["properties"])
        .find(|properties| properties["title"] == title)
}

/// Reads a `values` array, rendering non-string cells as text
fn parse_values(body: &Value) -> Vec<Vec<String>> {
    body["values"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| {
                            cells
                                .iter()
                                .map(|cell| match cell {
                                    Value::String(s) => s.clone(),
                                    Value::Null => String::new(),
                                    other => other.to_string(),
                                })
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// First row number of a range such as `'Sheet 1'!A12:F12`
fn first_row_of_range(range: &str) -> Option<usize> {
    let cells = range.rsplit('!').next()?;
    let start = cells.split(':').next()?;
    start
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$')
        .trim_start_matches('$')
        .parse()
        .ok()
}
