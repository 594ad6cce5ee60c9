//! Value resolver
//!
//! Turns a parsed [`Tag`] into a [`Value`]: source lookup through the
//! per-call cache (or the loop row), media-library unwrapping, dotted
//! traversal, SVG inlining and taxonomy-term flattening.

use crate::config::EngineConfig;
use crate::error::AssetError;
use crate::log::{LogLevel, Logger};
use crate::source::{AssetStore, DataSource, FieldMetadata, RecordId, Row};
use crate::tag::{Source, Tag};
use crate::value::{Object, ObjectKind, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const MEDIA_LIBRARY_TYPE: &str = "media_library";
const SVG_MIME_TYPE: &str = "image/svg+xml";

/// Replace a `{type: "media_library", value: X}` wrapper by `X`.
///
/// Anything else is returned unchanged.
pub fn unwrap_media_library_value(value: Value) -> Value {
    match value {
        Value::Map(mut map)
            if map.get("type").and_then(Value::as_str) == Some(MEDIA_LIBRARY_TYPE)
                && map.contains_key("value") =>
        {
            let inner = map.remove("value").unwrap_or_default();
            unwrap_media_library_value(inner)
        }
        other => other,
    }
}

/// Whether `object` is an attachment pointing at an SVG file
fn is_vector_attachment(object: &Object) -> bool {
    if object.kind != ObjectKind::Attachment {
        return false;
    }
    if object
        .text("mime_type")
        .is_some_and(|mime| mime.eq_ignore_ascii_case(SVG_MIME_TYPE))
    {
        return true;
    }
    ["url", "path"].iter().any(|key| {
        object.text(key).is_some_and(|location| {
            let location = location.split(['?', '#']).next().unwrap_or("");
            location.to_ascii_lowercase().ends_with(".svg")
        })
    })
}

/// Replace an SVG attachment by the file's text content.
///
/// The file is located through `path`, else `url`. Values that are not SVG
/// attachments, or that carry no location, are returned unchanged.
pub fn inline_vector_content(value: Value, assets: &dyn AssetStore) -> Result<Value, AssetError> {
    let Value::Object(object) = &value else {
        return Ok(value);
    };
    if !is_vector_attachment(object) {
        return Ok(value);
    }
    let Some(location) = object.text("path").or_else(|| object.text("url")) else {
        return Ok(value);
    };
    let content = assets.read_text(location)?;
    Ok(Value::Str(content))
}

/// Walk `properties` into nested maps and objects.
///
/// Any step that hits something else yields `Null`.
pub(crate) fn traverse(value: Value, properties: &[String]) -> Value {
    properties.iter().fold(value, |current, key| {
        match unwrap_media_library_value(current) {
            Value::Map(mut map) => map.remove(key).unwrap_or_default(),
            Value::Object(mut object) => object.fields.remove(key).unwrap_or_default(),
            _ => Value::Null,
        }
    })
}

/// Render term lists as their names, keeping the raw terms aside
fn flatten_terms(value: Value) -> (Value, Option<Vec<Object>>) {
    match value {
        Value::Object(object) if object.kind == ObjectKind::Term => {
            let name = Value::from(object.display_name());
            (name, Some(vec![object]))
        }
        Value::List(items) if is_term_list(&items) => {
            let terms: Vec<Object> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(object) => Some(object),
                    _ => None,
                })
                .collect();
            let names = terms
                .iter()
                .map(|term| Value::from(term.display_name()))
                .collect();
            (Value::List(names), Some(terms))
        }
        other => (other, None),
    }
}

fn is_term_list(items: &[Value]) -> bool {
    let mut saw_term = false;
    for item in items {
        match item {
            Value::Object(object) if object.kind == ObjectKind::Term => saw_term = true,
            Value::Null => {}
            _ => return false,
        }
    }
    saw_term
}

/// Outcome of resolving one tag, before filters
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolved {
    pub value: Value,
    /// Raw terms behind a flattened term list
    pub terms: Option<Vec<Object>>,
}

type CacheKey = (Source, RecordId, String);

/// Per-call resolver state.
///
/// Lives for one `process` / `process_loop_item` call; the cache and the
/// row are never shared between calls.
pub(crate) struct Resolver<'a> {
    sources: &'a BTreeMap<Source, Arc<dyn DataSource>>,
    assets: Option<&'a dyn AssetStore>,
    logger: &'a dyn Logger,
    config: &'a EngineConfig,
    row: Option<&'a Row>,
    cache: HashMap<CacheKey, Value>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        sources: &'a BTreeMap<Source, Arc<dyn DataSource>>,
        assets: Option<&'a dyn AssetStore>,
        logger: &'a dyn Logger,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            sources,
            assets,
            logger,
            config,
            row: None,
            cache: HashMap::new(),
        }
    }

    /// Bind a loop row; it shadows the `row` data source
    pub fn with_row(mut self, row: &'a Row) -> Self {
        self.row = Some(row);
        self
    }

    /// Number of cached lookups
    #[cfg(test)]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Raw value of `field`; `Null` when unset or when the source fails
    pub fn resolve(&mut self, source: Source, field: &str, record: RecordId) -> Value {
        if source == Source::Row {
            if let Some(row) = self.row {
                return row.get(field).cloned().unwrap_or_default();
            }
        }

        let key = (source, record, field.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let value = self.fetch(source, field, record);
        self.cache.insert(key, value.clone());
        value
    }

    fn fetch(&self, source: Source, field: &str, record: RecordId) -> Value {
        let Some(data_source) = self.sources.get(&source) else {
            self.logger.log(
                &format!("No data source registered for '{}', field '{}' is empty", source, field),
                LogLevel::Debug,
            );
            return Value::Null;
        };
        match data_source.value(field, record) {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                self.logger.log(
                    &format!("Failed to resolve '{}:{}' for record {}: {}", source, field, record, err),
                    LogLevel::Error,
                );
                Value::Null
            }
        }
    }

    /// Metadata of `field`, used by `field.label`
    pub fn resolve_metadata(&self, source: Source, field: &str, record: RecordId) -> Option<FieldMetadata> {
        if source == Source::Row && self.row.is_some() {
            return None;
        }
        let data_source = self.sources.get(&source)?;
        match data_source.metadata(field, record) {
            Ok(metadata) => metadata,
            Err(err) => {
                self.logger.log(
                    &format!("Failed to read metadata of '{}:{}': {}", source, field, err),
                    LogLevel::Error,
                );
                None
            }
        }
    }

    /// Resolve a tag's path to a value ready for its filter chain
    pub fn resolve_tag(&mut self, tag: &Tag, record: RecordId) -> Resolved {
        if tag.is_label_access() {
            let label = self
                .resolve_metadata(tag.source, tag.field(), record)
                .map(|metadata| Value::Str(metadata.label))
                .unwrap_or_default();
            return Resolved {
                value: label,
                terms: None,
            };
        }

        let raw = unwrap_media_library_value(self.resolve(tag.source, tag.field(), record));
        let value = unwrap_media_library_value(traverse(raw, tag.properties()));
        let value = self.inline_vector(value, tag);
        let (value, terms) = flatten_terms(value);
        Resolved { value, terms }
    }

    fn inline_vector(&self, value: Value, tag: &Tag) -> Value {
        if !self.config.inline_svg {
            return value;
        }
        let Some(assets) = self.assets else {
            return value;
        };
        match inline_vector_content(value.clone(), assets) {
            Ok(inlined) => inlined,
            Err(err) => {
                self.logger.log(
                    &format!("Failed to inline SVG for '{}': {}", tag, err),
                    LogLevel::Error,
                );
                value
            }
        }
    }
}
