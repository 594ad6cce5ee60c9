//! JSON data snapshots
//!
//! ```json
//! {
//!   "records": {
//!     "1": {
//!       "native": { "title": "Hello" },
//!       "custom": { "price": 75 },
//!       "meta": { "custom": { "price": { "label": "Price", "kind": "number" } } }
//!     }
//!   }
//! }
//! ```
//!
//! Objects carrying a `"$kind"` key (`attachment`, `term`, `record`)
//! become structured values; other JSON objects stay plain maps.

use anyhow::{Context as _, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tagweave_core::{DataSource, FieldInfo, FieldMetadata, RecordId, Row, Source, SourceError, Value};

#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    records: BTreeMap<String, RecordFile>,
}

#[derive(Debug, Default, Deserialize)]
struct RecordFile {
    #[serde(default)]
    native: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    custom: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    meta: BTreeMap<String, BTreeMap<String, FieldMetadata>>,
}

#[derive(Debug, Default)]
struct Record {
    fields: BTreeMap<Source, BTreeMap<String, Value>>,
    meta: BTreeMap<Source, BTreeMap<String, FieldMetadata>>,
}

/// All records of a data file, keyed by id
#[derive(Debug, Default)]
pub struct Snapshot {
    records: BTreeMap<RecordId, Record>,
}

impl Snapshot {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid data file '{}'", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(content)?;
        let mut records = BTreeMap::new();

        for (key, data) in file.records {
            let id: u64 = key
                .trim()
                .parse()
                .map_err(|_| anyhow!("Record key '{}' is not a numeric id", key))?;

            let mut record = Record::default();
            record.fields.insert(Source::Native, convert_fields(data.native));
            record.fields.insert(Source::Custom, convert_fields(data.custom));
            for (keyword, fields) in data.meta {
                let source = store_source(&keyword)?;
                record.meta.insert(source, fields);
            }
            records.insert(RecordId(id), record);
        }

        Ok(Self { records })
    }

    pub fn contains(&self, record: RecordId) -> bool {
        self.records.contains_key(&record)
    }

    pub fn record_ids(&self) -> Vec<RecordId> {
        self.records.keys().copied().collect()
    }

    fn field(&self, source: Source, field: &str, record: RecordId) -> Result<Option<&Value>, SourceError> {
        let data = self
            .records
            .get(&record)
            .ok_or(SourceError::RecordNotFound(record.0))?;
        Ok(data.fields.get(&source).and_then(|fields| fields.get(field)))
    }

    /// Rows of a repeated custom field: a list of objects, one per row
    pub fn rows(&self, field: &str, record: RecordId) -> Result<Vec<Row>> {
        let value = self
            .field(Source::Custom, field, record)?
            .ok_or_else(|| anyhow!("Field '{}' is not set on record {}", field, record))?;

        let Value::List(items) = value else {
            bail!("Field '{}' is not a repeated field", field);
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Map(fields) => Ok(fields.clone()),
                Value::Object(object) => Ok(object.fields.clone()),
                _ => Err(anyhow!("Row {} of '{}' is not an object", index, field)),
            })
            .collect()
    }

    fn label(&self, source: Source, field: &str) -> Option<&str> {
        self.records
            .values()
            .find_map(|r| r.meta.get(&source).and_then(|m| m.get(field)))
            .map(|meta| meta.label.as_str())
    }
}

/// Source keywords a snapshot can store data for
fn store_source(keyword: &str) -> Result<Source> {
    match Source::from_keyword(keyword) {
        Some(source @ (Source::Custom | Source::Native)) => Ok(source),
        _ => bail!("Unknown source '{}' in meta, expected 'custom' or 'native'", keyword),
    }
}

fn convert_fields(map: serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, Value> {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

/// One source keyword's view of a [`Snapshot`]
pub struct SnapshotSource {
    snapshot: Arc<Snapshot>,
    source: Source,
}

impl SnapshotSource {
    pub fn new(snapshot: Arc<Snapshot>, source: Source) -> Self {
        Self { snapshot, source }
    }
}

impl DataSource for SnapshotSource {
    fn value(&self, field: &str, record: RecordId) -> Result<Option<Value>, SourceError> {
        Ok(self.snapshot.field(self.source, field, record)?.cloned())
    }

    fn metadata(&self, field: &str, record: RecordId) -> Result<Option<FieldMetadata>, SourceError> {
        let data = self
            .snapshot
            .records
            .get(&record)
            .ok_or(SourceError::RecordNotFound(record.0))?;
        Ok(data
            .meta
            .get(&self.source)
            .and_then(|fields| fields.get(field))
            .cloned())
    }

    fn known_fields(&self, record: Option<RecordId>) -> Result<Vec<FieldInfo>, SourceError> {
        let mut names = BTreeSet::new();
        match record {
            Some(id) => {
                let data = self
                    .snapshot
                    .records
                    .get(&id)
                    .ok_or(SourceError::RecordNotFound(id.0))?;
                if let Some(fields) = data.fields.get(&self.source) {
                    names.extend(fields.keys());
                }
            }
            None => {
                for data in self.snapshot.records.values() {
                    if let Some(fields) = data.fields.get(&self.source) {
                        names.extend(fields.keys());
                    }
                }
            }
        }

        Ok(names
            .into_iter()
            .map(|name| FieldInfo {
                name: name.clone(),
                label: self
                    .snapshot
                    .label(self.source, name)
                    .unwrap_or(name.as_str())
                    .to_string(),
            })
            .collect())
    }
}
