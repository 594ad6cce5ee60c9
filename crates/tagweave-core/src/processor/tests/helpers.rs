//! Shared fixtures for processor tests

use crate::error::SourceError;
use crate::log::{LogLevel, Logger};
use crate::processor::Processor;
use crate::source::{DataSource, FieldInfo, FieldMetadata, RecordId};
use crate::tag::Source;
use crate::value::{Object, ObjectKind, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Field map shared by every record; `broken` always fails
#[derive(Default)]
pub(super) struct MapSource {
    values: BTreeMap<String, Value>,
    labels: BTreeMap<String, String>,
    calls: AtomicUsize,
}

impl MapSource {
    pub(super) fn new(values: &[(&str, Value)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            ..Self::default()
        }
    }

    pub(super) fn with_label(mut self, field: &str, label: &str) -> Self {
        self.labels.insert(field.to_string(), label.to_string());
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DataSource for MapSource {
    fn value(&self, field: &str, _record: RecordId) -> Result<Option<Value>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if field == "broken" {
            return Err(SourceError::Unavailable("connection reset".to_string()));
        }
        Ok(self.values.get(field).cloned())
    }

    fn metadata(&self, field: &str, _record: RecordId) -> Result<Option<FieldMetadata>, SourceError> {
        Ok(self
            .labels
            .get(field)
            .map(|label| FieldMetadata::new(label.as_str(), "text")))
    }

    fn known_fields(&self, _record: Option<RecordId>) -> Result<Vec<FieldInfo>, SourceError> {
        Ok(self
            .values
            .keys()
            .map(|name| FieldInfo {
                name: name.clone(),
                label: self.labels.get(name).cloned().unwrap_or_else(|| name.clone()),
            })
            .collect())
    }
}

/// Logger keeping every message for assertions
#[derive(Default)]
pub(super) struct Captured(Mutex<Vec<(LogLevel, String)>>);

impl Captured {
    pub(super) fn messages(&self, level: LogLevel) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Logger for Captured {
    fn log(&self, message: &str, level: LogLevel) {
        self.0.lock().unwrap().push((level, message.to_string()));
    }
}

/// A product page: title and price fields plus a few structured values
pub(super) fn shop_custom() -> MapSource {
    MapSource::new(&[
        ("price", Value::Int(75)),
        ("sale_price", Value::Float(19.5)),
        ("subtitle", Value::from("")),
        ("stock", Value::from("0")),
        ("sku", Value::from("AB-12")),
        ("featured", Value::Bool(false)),
        ("colors", Value::from("red, green, blue")),
        ("size", Value::from("large")),
        (
            "image",
            Value::Object(
                Object::new(ObjectKind::Attachment)
                    .with_field("url", "/uploads/shoe.jpg")
                    .with_field("alt", "A shoe"),
            ),
        ),
        (
            "tags",
            Value::List(vec![
                Value::Object(Object::new(ObjectKind::Term).with_field("name", "Sale").with_field("url", "/tag/sale")),
                Value::Object(Object::new(ObjectKind::Term).with_field("name", "New").with_field("url", "/tag/new")),
            ]),
        ),
    ])
    .with_label("price", "Price (EUR)")
}

pub(super) fn shop_native() -> MapSource {
    MapSource::new(&[("title", Value::from("Hello")), ("date", Value::from("2026-01-15"))])
}

/// Processor over the shop fixtures with a capturing logger
pub(super) fn shop() -> (Processor, Arc<Captured>) {
    let logger = Arc::new(Captured::default());
    let processor = Processor::default()
        .with_source(Source::Custom, Arc::new(shop_custom()))
        .with_source(Source::Native, Arc::new(shop_native()))
        .with_logger(logger.clone());
    (processor, logger)
}

/// Render with the shop fixtures for record 1
pub(super) fn render(template: &str) -> String {
    shop().0.process(template, 1)
}

/// Processor whose custom source holds just `values`
pub(super) fn with_custom(values: &[(&str, Value)]) -> Processor {
    Processor::default().with_source(Source::Custom, Arc::new(MapSource::new(values)))
}
