// crates/connectors/src/notion/adapter.rs
//! Store adapter over a database connector

use super::{title_property_name, DatabaseConnector, DatabaseItem, Properties};
use log::{debug, info, warn};
use serde_json::Value;
use sheetbridge_core::codec::{
    coerce, property_is_empty, property_schema, property_to_value, title_property,
    value_to_property,
};
use sheetbridge_core::{
    CanonicalRecord, FieldMappings, FieldValue, RemoteError, RemoteId, RemoteRecord, Revision,
    ValueKind, WriteReceipt,
};
use sheetbridge_resilience::RemoteCaller;
use sheetbridge_sync_engine::StoreAdapter;
use std::collections::BTreeMap;

/// Adapts a database to the engine's store contract
///
/// Page ids are used as record ids and `last_edited_time` as the revision.
/// Values are written with the property's actual type when the schema is
/// known, so a mapping declared as text still writes a title property.
pub struct DatabaseAdapter<C> {
    connector: C,
    mappings: FieldMappings,
    caller: RemoteCaller,
    schema: Option<BTreeMap<String, String>>,
}

impl<C: DatabaseConnector> DatabaseAdapter<C> {
    /// Creates an adapter; every connector call goes through `caller`
    pub fn new(connector: C, mappings: FieldMappings, caller: RemoteCaller) -> Self {
        Self {
            connector,
            mappings,
            caller,
            schema: None,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn fetch_schema(&mut self) -> Result<BTreeMap<String, String>, RemoteError> {
        let connector = &self.connector;
        let schema = self.caller.call("notion.schema", || connector.schema())?;
        self.schema = Some(schema.clone());
        Ok(schema)
    }

    fn cached_schema(&mut self) -> Result<BTreeMap<String, String>, RemoteError> {
        match &self.schema {
            Some(schema) => Ok(schema.clone()),
            None => self.fetch_schema(),
        }
    }

    fn record_from_item(&self, item: &DatabaseItem) -> CanonicalRecord {
        CanonicalRecord::from_fn(&self.mappings, |m| match item.properties.get(&m.database) {
            Some(property) => read_property(property, m.kind),
            None => FieldValue::Null,
        })
    }

    /// True when every mapped property is empty before any coercion
    fn item_is_blank(&self, item: &DatabaseItem) -> bool {
        self.mappings
            .iter()
            .all(|m| match item.properties.get(&m.database) {
                Some(property) => property_is_empty(property, actual_kind(property, m.kind)),
                None => true,
            })
    }

    fn properties_for(
        &self,
        schema: &BTreeMap<String, String>,
        record: &CanonicalRecord,
    ) -> Properties {
        self.mappings
            .iter()
            .map(|m| {
                let kind = schema
                    .get(&m.database)
                    .and_then(|name| ValueKind::from_name(name))
                    .unwrap_or(m.kind);
                (m.database.clone(), value_to_property(record.get(m.field()), kind))
            })
            .collect()
    }
}

/// Reads a property using the type it reports, then coerces to the declared kind
fn read_property(property: &Value, declared: ValueKind) -> FieldValue {
    let actual = actual_kind(property, declared);
    coerce(&property_to_value(property, actual), declared)
}

fn actual_kind(property: &Value, declared: ValueKind) -> ValueKind {
    property["type"]
        .as_str()
        .and_then(ValueKind::from_name)
        .unwrap_or(declared)
}

impl<C: DatabaseConnector> StoreAdapter for DatabaseAdapter<C> {
    fn name(&self) -> &str {
        "notion"
    }

    fn list_all(&mut self, _key_field: &str) -> Result<Vec<RemoteRecord>, RemoteError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let connector = &self.connector;
            let page = self
                .caller
                .call("notion.query", || connector.query(cursor.as_deref()))?;

            for item in &page.items {
                if self.item_is_blank(item) {
                    continue;
                }
                let record = self.record_from_item(item);
                let revision = Some(item.last_edited_time.as_str())
                    .filter(|t| !t.is_empty())
                    .map(Revision::new);
                records.push(RemoteRecord::new(RemoteId::new(&item.id), revision, record));
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!("notion: read {} non-blank pages", records.len());
        Ok(records)
    }

    fn upsert(
        &mut self,
        id: Option<&RemoteId>,
        record: &CanonicalRecord,
    ) -> Result<WriteReceipt, RemoteError> {
        let schema = self.cached_schema()?;
        let mut properties = self.properties_for(&schema, record);
        let connector = &self.connector;

        let item = match id {
            Some(id) => self
                .caller
                .call("notion.update", || connector.update(id.as_str(), &properties))?,
            None => {
                let writes_title = properties.keys().any(|name| {
                    schema.get(name).map(String::as_str) == Some("title")
                });
                if !writes_title {
                    match (title_property_name(&schema), record.key(&self.mappings)) {
                        (Some(title), Some(key)) => {
                            properties.insert(title.to_string(), title_property(key.as_str()));
                        }
                        _ => warn!("notion: no title property filled for new page"),
                    }
                }
                self.caller
                    .call("notion.create", || connector.create(&properties))?
            }
        };

        Ok(WriteReceipt {
            id: RemoteId::new(item.id),
            revision: Some(Revision::new(item.last_edited_time)).filter(|r| !r.as_str().is_empty()),
        })
    }

    fn ensure_columns(&mut self, names: &[String]) -> Result<(), RemoteError> {
        let schema = self.fetch_schema()?;
        let definitions: Properties = names
            .iter()
            .filter(|name| !schema.contains_key(name.as_str()))
            .map(|name| {
                let kind = self
                    .mappings
                    .by_database_name(name)
                    .map_or(ValueKind::Text, |m| m.kind);
                (name.clone(), property_schema(kind))
            })
            .collect();
        if definitions.is_empty() {
            return Ok(());
        }

        info!(
            "notion: adding properties {:?}",
            definitions.keys().collect::<Vec<_>>()
        );
        let connector = &self.connector;
        self.caller
            .call("notion.add_properties", || connector.add_properties(&definitions))?;
        self.fetch_schema()?;
        Ok(())
    }
}
