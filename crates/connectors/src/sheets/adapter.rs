// crates/connectors/src/sheets/adapter.rs
//! Store adapter over a tabular connector

use super::{header_position, parse_row_id, row_id, TabularConnector};
use log::{debug, info};
use sheetbridge_core::codec::{cell_is_empty, cell_to_value, value_to_cell};
use sheetbridge_core::{
    CanonicalRecord, FieldMappings, FieldValue, RemoteError, RemoteId, RemoteRecord, WriteReceipt,
};
use sheetbridge_resilience::RemoteCaller;
use sheetbridge_sync_engine::StoreAdapter;

/// Rows fetched per read window
pub const DEFAULT_BATCH_ROWS: usize = 500;

/// Adapts a worksheet to the engine's store contract
///
/// Record ids are `row:N`. Updates write only mapped cells; creates append a
/// full row in header order. The header is cached between calls and re-read
/// at the start of every listing.
pub struct SheetAdapter<C> {
    connector: C,
    mappings: FieldMappings,
    caller: RemoteCaller,
    batch_rows: usize,
    header: Option<Vec<String>>,
}

impl<C: TabularConnector> SheetAdapter<C> {
    /// Creates an adapter; every connector call goes through `caller`
    pub fn new(connector: C, mappings: FieldMappings, caller: RemoteCaller) -> Self {
        Self {
            connector,
            mappings,
            caller,
            batch_rows: DEFAULT_BATCH_ROWS,
            header: None,
        }
    }

    /// Sets the read window size
    pub fn with_batch_rows(mut self, rows: usize) -> Self {
        self.batch_rows = rows.max(1);
        self
    }

    /// Returns the wrapped connector
    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn fetch_header(&mut self) -> Result<Vec<String>, RemoteError> {
        let connector = &self.connector;
        let header = self.caller.call("sheets.header", || connector.header())?;
        self.header = Some(header.clone());
        Ok(header)
    }

    fn cached_header(&mut self) -> Result<Vec<String>, RemoteError> {
        match &self.header {
            Some(header) => Ok(header.clone()),
            None => self.fetch_header(),
        }
    }

    fn record_from_row(&self, header: &[String], row: &[String]) -> CanonicalRecord {
        CanonicalRecord::from_fn(&self.mappings, |m| {
            header_position(header, &m.sheet)
                .and_then(|col| row.get(col - 1))
                .map(|cell| cell_to_value(cell, m.kind))
                .unwrap_or(FieldValue::Null)
        })
    }

    /// True when every mapped cell is empty before any coercion
    fn row_is_blank(&self, header: &[String], row: &[String]) -> bool {
        self.mappings.iter().all(|m| {
            header_position(header, &m.sheet)
                .and_then(|col| row.get(col - 1))
                .map_or(true, |cell| cell_is_empty(cell, m.kind))
        })
    }

    /// Mapped cells of a record, failing if a mapped column is missing
    fn mapped_cells(
        &self,
        header: &[String],
        record: &CanonicalRecord,
    ) -> Result<Vec<(usize, String)>, RemoteError> {
        self.mappings
            .iter()
            .map(|m| {
                let col = header_position(header, &m.sheet).ok_or_else(|| {
                    RemoteError::Permanent(format!("column {:?} missing from header", m.sheet))
                })?;
                Ok((col, value_to_cell(record.get(m.field()), m.kind)))
            })
            .collect()
    }
}

impl<C: TabularConnector> StoreAdapter for SheetAdapter<C> {
    fn name(&self) -> &str {
        "sheets"
    }

    fn list_all(&mut self, _key_field: &str) -> Result<Vec<RemoteRecord>, RemoteError> {
        let header = self.fetch_header()?;
        if header.is_empty() {
            return Ok(Vec::new());
        }

        let connector = &self.connector;
        let extent = self.caller.call("sheets.row_count", || connector.row_count())?;

        let mut records = Vec::new();
        let mut start = 2;
        while start <= extent {
            let connector = &self.connector;
            let count = self.batch_rows.min(extent - start + 1);
            let rows = self
                .caller
                .call("sheets.read_rows", || connector.read_rows(start, count))?;

            for (offset, row) in rows.iter().enumerate() {
                if self.row_is_blank(&header, row) {
                    continue;
                }
                let record = self.record_from_row(&header, row);
                let id = RemoteId::new(row_id(start + offset));
                records.push(RemoteRecord::new(id, None, record));
            }
            start += count;
        }

        debug!("sheets: read {} non-blank rows", records.len());
        Ok(records)
    }

    fn upsert(
        &mut self,
        id: Option<&RemoteId>,
        record: &CanonicalRecord,
    ) -> Result<WriteReceipt, RemoteError> {
        let header = self.cached_header()?;
        let cells = self.mapped_cells(&header, record)?;
        let connector = &self.connector;

        match id {
            Some(id) => {
                let row = parse_row_id(id.as_str())
                    .ok_or_else(|| RemoteError::Permanent(format!("not a row id: {}", id)))?;
                self.caller
                    .call("sheets.write_cells", || connector.write_cells(row, &cells))?;
                Ok(WriteReceipt {
                    id: id.clone(),
                    revision: None,
                })
            }
            None => {
                let mut values = vec![String::new(); header.len()];
                for (col, text) in cells {
                    values[col - 1] = text;
                }
                let row = self
                    .caller
                    .call("sheets.append_row", || connector.append_row(&values))?;
                Ok(WriteReceipt {
                    id: RemoteId::new(row_id(row)),
                    revision: None,
                })
            }
        }
    }

    fn ensure_columns(&mut self, names: &[String]) -> Result<(), RemoteError> {
        let connector = &self.connector;
        self.caller.call("sheets.resolve", || connector.resolve())?;

        let mut header = self.fetch_header()?;
        let missing: Vec<String> = names
            .iter()
            .filter(|name| header_position(&header, name).is_none())
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        info!("sheets: adding columns {:?}", missing);
        header.extend(missing);
        let connector = &self.connector;
        self.caller
            .call("sheets.write_header", || connector.write_header(&header))?;
        self.header = Some(header);
        Ok(())
    }
}
