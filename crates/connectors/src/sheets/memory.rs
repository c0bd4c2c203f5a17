// crates/connectors/src/sheets/memory.rs
//! In-memory worksheet

use super::TabularConnector;
use sheetbridge_core::RemoteError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct SheetState {
    /// Row 1 is `rows[0]`
    rows: Vec<Vec<String>>,
    failures: VecDeque<RemoteError>,
    calls: usize,
    writes: usize,
}

/// Worksheet held in memory; clones share the same cells
///
/// Queued failures are returned by the next calls, in order, which lets
/// tests simulate throttling and outages.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    state: Arc<Mutex<SheetState>>,
}

impl MemorySheet {
    /// Creates an empty worksheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a worksheet with a header and data rows
    pub fn with_rows<S: AsRef<str>>(header: &[S], rows: &[Vec<S>]) -> Self {
        let sheet = Self::new();
        {
            let mut state = sheet.lock();
            state.rows.push(header.iter().map(|s| s.as_ref().to_string()).collect());
            for row in rows {
                state
                    .rows
                    .push(row.iter().map(|s| s.as_ref().to_string()).collect());
            }
        }
        sheet
    }

    /// Queues an error for the next call
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().failures.push_back(error);
    }

    /// Snapshot of every row including the header
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.lock().rows.clone()
    }

    /// Text of one cell addressed by row number and header name
    pub fn cell(&self, row: usize, column: &str) -> Option<String> {
        let state = self.lock();
        let header = state.rows.first()?;
        let col = super::header_position(header, column)?;
        let cells = state.rows.get(row.checked_sub(1)?)?;
        Some(cells.get(col - 1).cloned().unwrap_or_default())
    }

    /// Edits one cell outside of any adapter
    pub fn set_cell(&self, row: usize, column: &str, value: &str) {
        let mut state = self.lock();
        let col = match state.rows.first().and_then(|h| super::header_position(h, column)) {
            Some(col) => col,
            None => return,
        };
        if let Some(cells) = state.rows.get_mut(row.saturating_sub(1)) {
            if cells.len() < col {
                cells.resize(col, String::new());
            }
            cells[col - 1] = value.to_string();
        }
    }

    /// Number of calls received, failed ones included
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, SheetState> {
        // a panic while holding the lock only happens in a failing test
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<MutexGuard<'_, SheetState>, RemoteError> {
        let mut state = self.lock();
        state.calls += 1;
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

/// Length of `rows` once empty rows at the end are dropped
fn last_non_empty(rows: &[Vec<String>]) -> usize {
    rows.iter()
        .rposition(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map_or(0, |idx| idx + 1)
}

impl TabularConnector for MemorySheet {
    fn resolve(&self) -> Result<(), RemoteError> {
        self.begin().map(|_| ())
    }

    fn header(&self) -> Result<Vec<String>, RemoteError> {
        let state = self.begin()?;
        Ok(state.rows.first().cloned().unwrap_or_default())
    }

    fn write_header(&self, header: &[String]) -> Result<(), RemoteError> {
        let mut state = self.begin()?;
        if state.rows.is_empty() {
            state.rows.push(Vec::new());
        }
        state.rows[0] = header.to_vec();
        state.writes += 1;
        Ok(())
    }

    fn row_count(&self) -> Result<usize, RemoteError> {
        let state = self.begin()?;
        Ok(state.rows.len())
    }

    fn read_rows(&self, start: usize, count: usize) -> Result<Vec<Vec<String>>, RemoteError> {
        let state = self.begin()?;
        let first = start.saturating_sub(1).min(state.rows.len());
        let last = first.saturating_add(count).min(state.rows.len());
        let window = &state.rows[first..last];
        Ok(window[..last_non_empty(window)].to_vec())
    }

    fn write_cells(&self, row: usize, cells: &[(usize, String)]) -> Result<(), RemoteError> {
        let mut state = self.begin()?;
        if row == 0 {
            return Err(RemoteError::Permanent("row numbers start at 1".to_string()));
        }
        if state.rows.len() < row {
            state.rows.resize(row, Vec::new());
        }
        let target = &mut state.rows[row - 1];
        for (col, text) in cells {
            if *col == 0 {
                return Err(RemoteError::Permanent("column numbers start at 1".to_string()));
            }
            if target.len() < *col {
                target.resize(*col, String::new());
            }
            target[col - 1] = text.clone();
        }
        state.writes += 1;
        Ok(())
    }

    fn append_row(&self, values: &[String]) -> Result<usize, RemoteError> {
        let mut state = self.begin()?;
        let end = last_non_empty(&state.rows).max(1);
        state.rows.truncate(end);
        state.rows.push(values.to_vec());
        state.writes += 1;
        Ok(state.rows.len())
    }
}
