// crates/sync-engine/src/baseline.rs
//! Meta baseline: the last state the engine wrote or saw as already equal

use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sheetbridge_core::{RemoteId, Revision, SyncKey};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const FILE_FORMAT_VERSION: u32 = 1;

/// Per-key snapshot taken after a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub key: SyncKey,
    /// Content hash of the values last written or observed equal
    pub last_hash: String,
    /// Database store revision at that time
    pub last_remote_revision: Option<Revision>,
    /// Database store id of the record
    pub remote_id: Option<RemoteId>,
    pub last_synced_at: DateTime<Utc>,
}

impl BaselineEntry {
    /// Creates an entry stamped with the current time
    pub fn new(
        key: SyncKey,
        last_hash: impl Into<String>,
        last_remote_revision: Option<Revision>,
        remote_id: Option<RemoteId>,
    ) -> Self {
        Self {
            key,
            last_hash: last_hash.into(),
            last_remote_revision,
            remote_id,
            last_synced_at: Utc::now(),
        }
    }

    /// Returns true if hash, revision or id differ from the given values
    pub fn is_stale(
        &self,
        hash: &str,
        revision: Option<&Revision>,
        remote_id: Option<&RemoteId>,
    ) -> bool {
        self.last_hash != hash
            || self.last_remote_revision.as_ref() != revision
            || self.remote_id.as_ref() != remote_id
    }
}

/// Durable side-store for baseline entries
///
/// Entries are created or overwritten, never deleted.
pub trait BaselineStore {
    /// Loads every entry keyed by sync key
    fn load_all(&mut self) -> SyncResult<HashMap<SyncKey, BaselineEntry>>;

    /// Creates or overwrites the entry for `entry.key`
    fn upsert(&mut self, entry: BaselineEntry) -> SyncResult<()>;
}

impl<T: BaselineStore + ?Sized> BaselineStore for Box<T> {
    fn load_all(&mut self) -> SyncResult<HashMap<SyncKey, BaselineEntry>> {
        (**self).load_all()
    }

    fn upsert(&mut self, entry: BaselineEntry) -> SyncResult<()> {
        (**self).upsert(entry)
    }
}

/// Baseline kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryBaseline {
    entries: HashMap<SyncKey, BaselineEntry>,
}

impl MemoryBaseline {
    /// Creates an empty baseline
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a baseline pre-populated with entries
    pub fn with_entries(entries: impl IntoIterator<Item = BaselineEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.key.clone(), e)).collect(),
        }
    }

    /// Looks up one entry
    pub fn get(&self, key: &SyncKey) -> Option<&BaselineEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BaselineStore for MemoryBaseline {
    fn load_all(&mut self) -> SyncResult<HashMap<SyncKey, BaselineEntry>> {
        Ok(self.entries.clone())
    }

    fn upsert(&mut self, entry: BaselineEntry) -> SyncResult<()> {
        self.entries.insert(entry.key.clone(), entry);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BaselineFile {
    version: u32,
    entries: BTreeMap<String, BaselineEntry>,
}

/// Baseline persisted as one JSON document
///
/// The whole file is rewritten through a temporary file and renamed into
/// place after every upsert, so an interrupted run never leaves a torn file.
/// A missing file is an empty baseline.
#[derive(Debug)]
pub struct JsonFileBaseline {
    path: PathBuf,
    entries: BTreeMap<String, BaselineEntry>,
    loaded: bool,
}

impl JsonFileBaseline {
    /// Creates a baseline backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            loaded: false,
        }
    }

    /// Returns the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> SyncResult<BTreeMap<String, BaselineEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No baseline at {}, starting empty", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(SyncError::BaselineIo {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let file: BaselineFile = serde_json::from_str(&content)?;
        if file.version > FILE_FORMAT_VERSION {
            return Err(SyncError::Baseline(format!(
                "{} has format version {}, newest supported is {}",
                self.path.display(),
                file.version,
                FILE_FORMAT_VERSION
            )));
        }
        Ok(file.entries)
    }

    fn ensure_loaded(&mut self) -> SyncResult<()> {
        if !self.loaded {
            self.entries = self.read_file()?;
            self.loaded = true;
        }
        Ok(())
    }

    fn write_atomic(&self) -> SyncResult<()> {
        let io_err = |source: std::io::Error| SyncError::BaselineIo {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(io_err)?;

        let file = BaselineFile {
            version: FILE_FORMAT_VERSION,
            entries: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        let mut temp_file = NamedTempFile::new_in(&dir).map_err(io_err)?;
        temp_file.write_all(content.as_bytes()).map_err(io_err)?;
        temp_file.flush().map_err(io_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|e| io_err(e.error))?;

        Ok(())
    }
}

impl BaselineStore for JsonFileBaseline {
    fn load_all(&mut self) -> SyncResult<HashMap<SyncKey, BaselineEntry>> {
        self.entries = self.read_file()?;
        self.loaded = true;
        Ok(self
            .entries
            .values()
            .map(|e| (e.key.clone(), e.clone()))
            .collect())
    }

    fn upsert(&mut self, entry: BaselineEntry) -> SyncResult<()> {
        self.ensure_loaded()?;
        self.entries.insert(entry.key.as_str().to_string(), entry);
        self.write_atomic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(key: &str, hash: &str) -> BaselineEntry {
        BaselineEntry::new(
            SyncKey::parse(key).unwrap(),
            hash,
            Some(Revision::new("2024-01-01T00:00:00.000Z")),
            Some(RemoteId::new("page-1")),
        )
    }

    #[test]
    fn test_memory_baseline_upsert_overwrites() {
        let mut baseline = MemoryBaseline::new();
        baseline.upsert(entry("K1", "aaa")).unwrap();
        baseline.upsert(entry("K1", "bbb")).unwrap();

        let all = baseline.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[&SyncKey::parse("K1").unwrap()].last_hash, "bbb");
    }

    #[test]
    fn test_is_stale() {
        let e = entry("K1", "aaa");
        let rev = Revision::new("2024-01-01T00:00:00.000Z");
        let id = RemoteId::new("page-1");
        assert!(!e.is_stale("aaa", Some(&rev), Some(&id)));
        assert!(e.is_stale("bbb", Some(&rev), Some(&id)));
        assert!(e.is_stale("aaa", None, Some(&id)));
        assert!(e.is_stale("aaa", Some(&rev), Some(&RemoteId::new("page-2"))));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut baseline = JsonFileBaseline::new(dir.path().join("baseline.json"));
        assert!(baseline.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("baseline.json");

        let mut first = JsonFileBaseline::new(&path);
        first.upsert(entry("K1", "aaa")).unwrap();
        first.upsert(entry("K2", "bbb")).unwrap();
        assert!(path.exists());

        let mut second = JsonFileBaseline::new(&path);
        let all = second.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&SyncKey::parse("K2").unwrap()].last_hash, "bbb");
        assert_eq!(
            all[&SyncKey::parse("K1").unwrap()].remote_id,
            Some(RemoteId::new("page-1"))
        );
    }

    #[test]
    fn test_upsert_keeps_existing_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("baseline.json");

        JsonFileBaseline::new(&path).upsert(entry("K1", "aaa")).unwrap();
        // a fresh instance that never called load_all must not drop K1
        JsonFileBaseline::new(&path).upsert(entry("K2", "bbb")).unwrap();

        let all = JsonFileBaseline::new(&path).load_all().unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("baseline.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFileBaseline::new(&path).load_all();
        assert!(matches!(result, Err(SyncError::Serialization(_))));
    }

    #[test]
    fn test_newer_format_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("baseline.json");
        fs::write(&path, r#"{"version": 99, "entries": {}}"#).unwrap();

        let result = JsonFileBaseline::new(&path).load_all();
        assert!(matches!(result, Err(SyncError::Baseline(_))));
    }
}
