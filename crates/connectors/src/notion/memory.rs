// crates/connectors/src/notion/memory.rs
//! In-memory database

use super::{DatabaseConnector, DatabaseItem, DatabasePage, Properties};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use sheetbridge_core::RemoteError;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

const REVISION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug)]
struct DatabaseState {
    schema: BTreeMap<String, String>,
    items: Vec<DatabaseItem>,
    page_size: usize,
    failures: VecDeque<RemoteError>,
    write_failures: BTreeMap<usize, RemoteError>,
    calls: usize,
    write_attempts: usize,
    writes: usize,
    next_id: usize,
    clock: DateTime<Utc>,
}

/// Database held in memory; clones share the same pages
///
/// Every write moves the page's `last_edited_time` forward by one second, so
/// revision markers are strictly increasing. Writes that name a property
/// missing from the schema, or carry the wrong type, are rejected the way the
/// real API rejects them.
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    state: Arc<Mutex<DatabaseState>>,
}

impl MemoryDatabase {
    /// Creates an empty database from `(name, type)` pairs
    pub fn with_schema(schema: &[(&str, &str)]) -> Self {
        let state = DatabaseState {
            schema: schema
                .iter()
                .map(|(name, kind)| (name.to_string(), kind.to_string()))
                .collect(),
            items: Vec::new(),
            page_size: super::PAGE_SIZE,
            failures: VecDeque::new(),
            write_failures: BTreeMap::new(),
            calls: 0,
            write_attempts: 0,
            writes: 0,
            next_id: 1,
            clock: DateTime::<Utc>::default() + Duration::days(19_723),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Sets the query window size
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.lock().page_size = page_size.max(1);
        self
    }

    /// Queues an error for the next call
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().failures.push_back(error);
    }

    /// Fails the `nth` create or update (1-based, counted since creation)
    pub fn fail_write(&self, nth: usize, error: RemoteError) {
        self.lock().write_failures.insert(nth, error);
    }

    /// Snapshot of every page in creation order
    pub fn items(&self) -> Vec<DatabaseItem> {
        self.lock().items.clone()
    }

    /// Looks up one page
    pub fn item(&self, id: &str) -> Option<DatabaseItem> {
        self.lock().items.iter().find(|item| item.id == id).cloned()
    }

    /// Current schema
    pub fn schema_snapshot(&self) -> BTreeMap<String, String> {
        self.lock().schema.clone()
    }

    /// Replaces one property outside of any adapter, bumping the revision
    pub fn edit(&self, id: &str, name: &str, property: Value) -> bool {
        let mut state = self.lock();
        let stamp = state.tick();
        match state.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.properties.insert(name.to_string(), property);
                item.last_edited_time = stamp;
                true
            }
            None => false,
        }
    }

    /// Inserts a page directly, as if created by a user
    pub fn insert(&self, properties: Properties) -> String {
        let mut state = self.lock();
        let item = state.new_item(properties);
        let id = item.id.clone();
        state.items.push(item);
        id
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, DatabaseState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<MutexGuard<'_, DatabaseState>, RemoteError> {
        let mut state = self.lock();
        state.calls += 1;
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

impl DatabaseState {
    fn tick(&mut self) -> String {
        self.clock += Duration::seconds(1);
        self.clock.format(REVISION_FORMAT).to_string()
    }

    fn begin_write(&mut self) -> Result<(), RemoteError> {
        self.write_attempts += 1;
        match self.write_failures.remove(&self.write_attempts) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn new_item(&mut self, properties: Properties) -> DatabaseItem {
        let id = format!("page-{:04}", self.next_id);
        self.next_id += 1;
        DatabaseItem {
            id,
            last_edited_time: self.tick(),
            properties,
        }
    }

    /// Checks names and types, tagging each property with its type
    fn validate(&self, properties: &Properties) -> Result<Properties, RemoteError> {
        let mut tagged = Properties::new();
        for (name, value) in properties {
            let kind = self.schema.get(name).ok_or_else(|| {
                RemoteError::Permanent(format!("{} is not a property that exists", name))
            })?;
            let mut value = value.clone();
            let object = value.as_object_mut().ok_or_else(|| {
                RemoteError::Permanent(format!("{} should be an object", name))
            })?;
            if !object.contains_key(kind.as_str()) {
                return Err(RemoteError::Permanent(format!(
                    "{} is expected to be {}",
                    name, kind
                )));
            }
            object.insert("type".to_string(), json!(kind));
            tagged.insert(name.clone(), value);
        }
        Ok(tagged)
    }
}

impl DatabaseConnector for MemoryDatabase {
    fn schema(&self) -> Result<BTreeMap<String, String>, RemoteError> {
        Ok(self.begin()?.schema.clone())
    }

    fn add_properties(&self, definitions: &Properties) -> Result<(), RemoteError> {
        let mut state = self.begin()?;
        for (name, definition) in definitions {
            let kind = definition
                .as_object()
                .and_then(|def| def.keys().next())
                .ok_or_else(|| {
                    RemoteError::Permanent(format!("{} has no property type", name))
                })?;
            if kind == "title" && super::title_property_name(&state.schema).is_some() {
                return Err(RemoteError::Permanent(
                    "a database can only have one title property".to_string(),
                ));
            }
            state.schema.insert(name.clone(), kind.clone());
        }
        Ok(())
    }

    fn query(&self, cursor: Option<&str>) -> Result<DatabasePage, RemoteError> {
        let state = self.begin()?;
        let start = match cursor {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| RemoteError::Permanent(format!("invalid cursor {:?}", cursor)))?,
            None => 0,
        };
        let end = (start + state.page_size).min(state.items.len());
        let items = state.items.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_cursor = (end < state.items.len()).then(|| end.to_string());
        Ok(DatabasePage { items, next_cursor })
    }

    fn create(&self, properties: &Properties) -> Result<DatabaseItem, RemoteError> {
        let mut state = self.begin()?;
        state.begin_write()?;
        let tagged = state.validate(properties)?;
        let item = state.new_item(tagged);
        state.items.push(item.clone());
        state.writes += 1;
        Ok(item)
    }

    fn update(&self, id: &str, properties: &Properties) -> Result<DatabaseItem, RemoteError> {
        let mut state = self.begin()?;
        state.begin_write()?;
        let tagged = state.validate(properties)?;
        let stamp = state.tick();
        let item = state
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| RemoteError::Permanent(format!("Could not find page {}", id)))?;
        item.properties.extend(tagged);
        item.last_edited_time = stamp;
        let updated = item.clone();
        state.writes += 1;
        Ok(updated)
    }
}
