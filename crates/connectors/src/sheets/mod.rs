// crates/connectors/src/sheets/mod.rs
//! Tabular store: a spreadsheet worksheet with a header row
//!
//! Rows and columns are 1-based, row 1 is the header. Cells are plain text;
//! typed interpretation happens in the cell codec.

mod adapter;
mod baseline;
mod http;
mod memory;

pub use adapter::SheetAdapter;
pub use baseline::{SheetBaseline, DEFAULT_META_WORKSHEET, META_HEADERS};
pub use http::{SheetsConnector, SHEETS_API_BASE};
pub use memory::MemorySheet;

use sheetbridge_core::RemoteError;

/// Worksheet operations the tabular adapter needs
pub trait TabularConnector {
    /// Makes sure the worksheet exists, creating it if missing
    fn resolve(&self) -> Result<(), RemoteError>;

    /// Reads the header row; empty when the sheet is blank
    fn header(&self) -> Result<Vec<String>, RemoteError>;

    /// Replaces the header row
    fn write_header(&self, header: &[String]) -> Result<(), RemoteError>;

    /// Number of rows in the worksheet grid, blank rows included
    ///
    /// Readers walk windows up to this bound; a short window is not the end
    /// of the sheet.
    fn row_count(&self) -> Result<usize, RemoteError>;

    /// Reads up to `count` rows starting at row `start`
    ///
    /// Empty rows at the end of the requested range are not returned and
    /// trailing empty cells may be missing, so callers must pad.
    fn read_rows(&self, start: usize, count: usize) -> Result<Vec<Vec<String>>, RemoteError>;

    /// Writes individual cells of one row as `(column, text)` pairs
    fn write_cells(&self, row: usize, cells: &[(usize, String)]) -> Result<(), RemoteError>;

    /// Appends a row after the last non-empty row and returns its number
    fn append_row(&self, values: &[String]) -> Result<usize, RemoteError>;
}

/// Column letters for a 1-based column index (1 -> A, 27 -> AA)
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Opaque row id used by the tabular adapter
pub(crate) fn row_id(row: usize) -> String {
    format!("row:{}", row)
}

/// Parses a row id back into its row number
pub(crate) fn parse_row_id(id: &str) -> Option<usize> {
    id.strip_prefix("row:")?.parse().ok().filter(|row| *row >= 2)
}

/// Position of each header name, first occurrence wins
pub(crate) fn header_position(header: &[String], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|h| h.trim() == name.trim())
        .map(|idx| idx + 1)
}
