// crates/connectors/src/sheets/baseline.rs
//! Baseline kept in a hidden worksheet next to the synced one

use super::{header_position, TabularConnector};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use sheetbridge_core::{RemoteError, RemoteId, Revision, SyncKey};
use sheetbridge_resilience::RemoteCaller;
use sheetbridge_sync_engine::{BaselineEntry, BaselineStore, SyncError, SyncResult};
use std::collections::HashMap;

/// Header of the meta worksheet, in column order
pub const META_HEADERS: [&str; 5] = [
    "key",
    "notion_page_id",
    "notion_last_edited_time",
    "sheets_row_hash",
    "last_synced_at",
];

/// Default title of the meta worksheet
pub const DEFAULT_META_WORKSHEET: &str = "_SyncMeta";

const STORE_NAME: &str = "sheets meta";
const DEFAULT_BATCH_ROWS: usize = 500;

/// Baseline store backed by a worksheet, one row per sync key
///
/// Loading never writes. The [`META_HEADERS`] row is added when the first
/// entry is stored. Columns are located by header name, so a user may
/// reorder them.
pub struct SheetBaseline<C> {
    connector: C,
    caller: RemoteCaller,
    batch_rows: usize,
    header: Option<Vec<String>>,
    rows: HashMap<SyncKey, usize>,
}

impl<C: TabularConnector> SheetBaseline<C> {
    pub fn new(connector: C, caller: RemoteCaller) -> Self {
        Self {
            connector,
            caller,
            batch_rows: DEFAULT_BATCH_ROWS,
            header: None,
            rows: HashMap::new(),
        }
    }

    /// Sets the read window size
    pub fn with_batch_rows(mut self, rows: usize) -> Self {
        self.batch_rows = rows.max(1);
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Resolves the worksheet and reads its header without writing it
    fn read_header(&mut self) -> Result<Vec<String>, RemoteError> {
        let connector = &self.connector;
        self.caller.call("meta.resolve", || connector.resolve())?;
        let header = self.caller.call("meta.header", || connector.header())?;
        if META_HEADERS
            .iter()
            .all(|name| header_position(&header, name).is_some())
        {
            self.header = Some(header.clone());
        }
        Ok(header)
    }

    /// Writes any missing meta columns before the first entry is stored
    fn prepare(&mut self) -> Result<Vec<String>, RemoteError> {
        if let Some(header) = &self.header {
            return Ok(header.clone());
        }

        let mut header = self.read_header()?;
        let missing: Vec<String> = META_HEADERS
            .iter()
            .filter(|name| header_position(&header, name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            info!("meta: writing columns {:?}", missing);
            header.extend(missing);
            let connector = &self.connector;
            self.caller
                .call("meta.write_header", || connector.write_header(&header))?;
        }

        self.header = Some(header.clone());
        Ok(header)
    }

    fn entry_from_row(header: &[String], row: &[String]) -> Option<BaselineEntry> {
        let cell = |name: &str| meta_cell(header, row, name);

        let key = SyncKey::parse(cell(META_HEADERS[0])).ok()?;
        let remote_id = Some(cell(META_HEADERS[1]))
            .filter(|s| !s.is_empty())
            .map(RemoteId::new);
        let revision = Some(cell(META_HEADERS[2]))
            .filter(|s| !s.is_empty())
            .map(Revision::new);
        let last_synced_at = DateTime::parse_from_rfc3339(cell(META_HEADERS[4]))
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();

        Some(BaselineEntry {
            key,
            last_hash: cell(META_HEADERS[3]).to_string(),
            last_remote_revision: revision,
            remote_id,
            last_synced_at,
        })
    }

    fn cells_for(
        header: &[String],
        entry: &BaselineEntry,
    ) -> Result<Vec<(usize, String)>, RemoteError> {
        let values = [
            entry.key.to_string(),
            entry
                .remote_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            entry
                .last_remote_revision
                .as_ref()
                .map(|rev| rev.to_string())
                .unwrap_or_default(),
            entry.last_hash.clone(),
            entry.last_synced_at.to_rfc3339(),
        ];

        META_HEADERS
            .iter()
            .zip(values)
            .map(|(name, value)| {
                header_position(header, name)
                    .map(|col| (col, value))
                    .ok_or_else(|| RemoteError::Permanent(format!("meta column {:?} missing", name)))
            })
            .collect()
    }

    fn write(&mut self, entry: &BaselineEntry) -> Result<(), RemoteError> {
        let header = self.prepare()?;
        let cells = Self::cells_for(&header, entry)?;
        let connector = &self.connector;

        if let Some(&row) = self.rows.get(&entry.key) {
            return self
                .caller
                .call("meta.write_cells", || connector.write_cells(row, &cells));
        }

        let mut values = vec![String::new(); header.len()];
        for (col, value) in cells {
            values[col - 1] = value;
        }
        let row = self
            .caller
            .call("meta.append_row", || connector.append_row(&values))?;
        self.rows.insert(entry.key.clone(), row);
        Ok(())
    }
}

fn meta_cell<'a>(header: &[String], row: &'a [String], name: &str) -> &'a str {
    header_position(header, name)
        .and_then(|col| row.get(col - 1))
        .map(|c| c.trim())
        .unwrap_or_default()
}

impl<C: TabularConnector> BaselineStore for SheetBaseline<C> {
    fn load_all(&mut self) -> SyncResult<HashMap<SyncKey, BaselineEntry>> {
        let header = match &self.header {
            Some(header) => header.clone(),
            None => self
                .read_header()
                .map_err(|e| SyncError::remote(STORE_NAME, e))?,
        };

        let mut entries = HashMap::new();
        self.rows.clear();
        if header_position(&header, META_HEADERS[0]).is_none() {
            debug!("meta: no key column yet, starting from an empty baseline");
            return Ok(entries);
        }
        let connector = &self.connector;
        let extent = self
            .caller
            .call("meta.row_count", || connector.row_count())
            .map_err(|e| SyncError::remote(STORE_NAME, e))?;

        let mut start = 2;
        while start <= extent {
            let connector = &self.connector;
            let count = self.batch_rows.min(extent - start + 1);
            let rows = self
                .caller
                .call("meta.read_rows", || connector.read_rows(start, count))
                .map_err(|e| SyncError::remote(STORE_NAME, e))?;

            for (offset, row) in rows.iter().enumerate() {
                match Self::entry_from_row(&header, row) {
                    Some(entry) => {
                        // a later row for the same key replaces the earlier one
                        self.rows.insert(entry.key.clone(), start + offset);
                        entries.insert(entry.key.clone(), entry);
                    }
                    None if row.iter().any(|c| !c.trim().is_empty()) => {
                        warn!("meta: row {} has no key, ignoring", start + offset);
                    }
                    None => {}
                }
            }
            start += count;
        }

        debug!("meta: loaded {} baseline entries", entries.len());
        Ok(entries)
    }

    fn upsert(&mut self, entry: BaselineEntry) -> SyncResult<()> {
        self.write(&entry)
            .map_err(|e| SyncError::remote(STORE_NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::MemorySheet;
    use sheetbridge_resilience::{RateLimiter, RetryPolicy};

    fn caller() -> RemoteCaller {
        RemoteCaller::new(RateLimiter::per_minute(60_000), RetryPolicy::new(1))
    }

    fn entry(key: &str, hash: &str) -> BaselineEntry {
        BaselineEntry::new(
            SyncKey::parse(key).unwrap(),
            hash,
            Some(Revision::new("2024-05-01T10:00:00.000Z")),
            Some(RemoteId::new("page-1")),
        )
    }

    #[test]
    fn test_blank_sheet_gets_header_on_first_upsert() {
        let sheet = MemorySheet::new();
        let mut baseline = SheetBaseline::new(sheet.clone(), caller());
        assert!(baseline.load_all().unwrap().is_empty());
        assert_eq!(sheet.write_count(), 0);

        baseline.upsert(entry("K1", "aaa")).unwrap();
        assert_eq!(sheet.rows()[0], META_HEADERS.map(String::from).to_vec());
    }

    #[test]
    fn test_upsert_appends_then_overwrites() {
        let sheet = MemorySheet::new();
        let mut baseline = SheetBaseline::new(sheet.clone(), caller());
        baseline.load_all().unwrap();

        baseline.upsert(entry("K1", "aaa")).unwrap();
        baseline.upsert(entry("K2", "bbb")).unwrap();
        baseline.upsert(entry("K1", "ccc")).unwrap();

        assert_eq!(sheet.rows().len(), 3);
        assert_eq!(sheet.cell(2, "sheets_row_hash").as_deref(), Some("ccc"));
        assert_eq!(sheet.cell(2, "notion_page_id").as_deref(), Some("page-1"));
    }

    #[test]
    fn test_entries_survive_reload() {
        let sheet = MemorySheet::new();
        let mut first = SheetBaseline::new(sheet.clone(), caller());
        let written = entry("K1", "aaa");
        first.upsert(written.clone()).unwrap();

        let mut second = SheetBaseline::new(sheet, caller());
        let loaded = second.load_all().unwrap();
        let got = &loaded[&written.key];
        assert_eq!(got.last_hash, "aaa");
        assert_eq!(got.last_remote_revision, written.last_remote_revision);
        assert_eq!(got.remote_id, written.remote_id);
        assert_eq!(got.last_synced_at.timestamp(), written.last_synced_at.timestamp());

        // overwrite goes to the same row after reload
        second.upsert(entry("K1", "zzz")).unwrap();
        assert_eq!(second.connector().rows().len(), 2);
    }

    #[test]
    fn test_reordered_columns_are_honored() {
        let sheet = MemorySheet::with_rows(
            &[
                "sheets_row_hash",
                "key",
                "last_synced_at",
                "notion_page_id",
                "notion_last_edited_time",
            ],
            &[vec!["h1", "K9", "", "", ""]],
        );
        let mut baseline = SheetBaseline::new(sheet, caller());
        let loaded = baseline.load_all().unwrap();
        let got = &loaded[&SyncKey::parse("K9").unwrap()];
        assert_eq!(got.last_hash, "h1");
        assert_eq!(got.remote_id, None);
    }

    #[test]
    fn test_rows_past_blank_window_end_are_loaded() {
        let header: Vec<&str> = META_HEADERS.to_vec();
        let sheet = MemorySheet::with_rows(
            &header,
            &[
                vec!["K1", "page-1", "", "h1", ""],
                vec!["", "", "", "", ""],
                vec!["K3", "page-3", "", "h3", ""],
            ],
        );
        let mut baseline = SheetBaseline::new(sheet.clone(), caller()).with_batch_rows(2);
        let loaded = baseline.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[&SyncKey::parse("K3").unwrap()].last_hash, "h3");

        // K3 is rewritten in place rather than appended again
        baseline.upsert(entry("K3", "h3b")).unwrap();
        assert_eq!(sheet.rows().len(), 4);
        assert_eq!(sheet.cell(4, "sheets_row_hash").as_deref(), Some("h3b"));
    }

    #[test]
    fn test_remote_failure_maps_to_sync_error() {
        let sheet = MemorySheet::new();
        sheet.fail_next(RemoteError::Permanent("forbidden".to_string()));
        let mut baseline = SheetBaseline::new(sheet, caller());
        let err = baseline.load_all().unwrap_err();
        assert!(matches!(err, SyncError::Remote { .. }));
    }
}
