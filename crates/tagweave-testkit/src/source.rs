//! In-memory data source with call accounting

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use tagweave_core::{DataSource, FieldInfo, FieldMetadata, RecordId, SourceError, Value};

/// Data source backed by maps.
///
/// Values set with [`with_field`](Self::with_field) apply to every record;
/// [`with_record_value`](Self::with_record_value) overrides them for one
/// record. Fields marked with [`failing_on`](Self::failing_on) return
/// `SourceError::Unavailable`.
#[derive(Debug, Default)]
pub struct MemorySource {
    shared: BTreeMap<String, Value>,
    records: BTreeMap<RecordId, BTreeMap<String, Value>>,
    metadata: BTreeMap<String, FieldMetadata>,
    failing: BTreeSet<String>,
    calls: Mutex<BTreeMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.shared.insert(field.to_string(), value.into());
        self
    }

    pub fn with_record_value(mut self, record: impl Into<RecordId>, field: &str, value: impl Into<Value>) -> Self {
        self.records
            .entry(record.into())
            .or_default()
            .insert(field.to_string(), value.into());
        self
    }

    pub fn with_label(mut self, field: &str, label: &str, kind: &str) -> Self {
        self.metadata
            .insert(field.to_string(), FieldMetadata::new(label, kind));
        self
    }

    pub fn failing_on(mut self, field: &str) -> Self {
        self.failing.insert(field.to_string());
        self
    }

    /// Total number of `value` lookups
    pub fn calls(&self) -> usize {
        self.lock_calls().values().sum()
    }

    /// Number of `value` lookups for one field
    pub fn calls_for(&self, field: &str) -> usize {
        self.lock_calls().get(field).copied().unwrap_or(0)
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, usize>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DataSource for MemorySource {
    fn value(&self, field: &str, record: RecordId) -> Result<Option<Value>, SourceError> {
        *self.lock_calls().entry(field.to_string()).or_default() += 1;
        if self.failing.contains(field) {
            return Err(SourceError::Unavailable(format!("field '{}' is unreachable", field)));
        }
        let value = self
            .records
            .get(&record)
            .and_then(|fields| fields.get(field))
            .or_else(|| self.shared.get(field));
        Ok(value.cloned())
    }

    fn metadata(&self, field: &str, _record: RecordId) -> Result<Option<FieldMetadata>, SourceError> {
        Ok(self.metadata.get(field).cloned())
    }

    fn known_fields(&self, record: Option<RecordId>) -> Result<Vec<FieldInfo>, SourceError> {
        let mut names: BTreeSet<&String> = self.shared.keys().collect();
        if let Some(fields) = record.and_then(|r| self.records.get(&r)) {
            names.extend(fields.keys());
        }
        Ok(names
            .into_iter()
            .map(|name| FieldInfo {
                name: name.clone(),
                label: self
                    .metadata
                    .get(name)
                    .map(|m| m.label.clone())
                    .unwrap_or_else(|| name.clone()),
            })
            .collect())
    }
}
