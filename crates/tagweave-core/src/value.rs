//! Resolved value model
//!
//! Every value flowing through the engine is one of the [`Value`] variants.
//! Only scalars and lists of scalars render to text; maps, objects and lists
//! holding composites render as the empty string unless a property access or
//! a filter reduces them first.

use std::collections::BTreeMap;

/// Canonical list separator used when splitting delimited strings
pub const LIST_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Object),
}

/// Kind of a structured object handed over by a data source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// File record: url, path, mime_type, alt, ...
    Attachment,
    /// Taxonomy term: name, slug, url
    Term,
    /// Linked record: id, title, url
    Record,
    Other(String),
}

impl ObjectKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "attachment" => ObjectKind::Attachment,
            "term" => ObjectKind::Term,
            "record" => ObjectKind::Record,
            other => ObjectKind::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ObjectKind::Attachment => "attachment",
            ObjectKind::Term => "term",
            ObjectKind::Record => "record",
            ObjectKind::Other(name) => name,
        }
    }
}

/// Opaque structured value (attachment, term, linked record)
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub kind: ObjectKind,
    pub fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Text field as string slice, if present and a string
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Human-readable name: `name`, then `title`, then `label`
    pub fn display_name(&self) -> Option<&str> {
        ["name", "title", "label"]
            .iter()
            .find_map(|key| self.text(key))
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of a scalar; `None` for lists and composites
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) | Value::Object(_) => None,
        }
    }

    /// Text form of a scalar or list of scalars.
    ///
    /// Lists drop null and empty entries and join the rest with `separator`.
    /// Returns `None` for maps, objects and lists containing them.
    pub fn to_text(&self, separator: &str) -> Option<String> {
        match self {
            Value::List(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    let text = item.scalar_text()?;
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
                Some(parts.join(separator))
            }
            other => other.scalar_text(),
        }
    }

    /// Final rendering: composites collapse to the empty string
    pub fn render(&self, separator: &str) -> String {
        self.to_text(separator).unwrap_or_default()
    }

    /// Lenient numeric view; anything non-numeric is `0.0`
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Bool(true) => 1.0,
            Value::Str(s) => lenient_f64(s),
            _ => 0.0,
        }
    }

    /// Strict numeric view used by numeric filters
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Entries of a list-like value.
    ///
    /// Lists are taken as-is, strings are split on `separator`, other
    /// non-null values become a single entry. Null and empty entries are
    /// dropped.
    pub fn into_items(self, separator: &str) -> Vec<Value> {
        let items = match self {
            Value::Null => Vec::new(),
            Value::List(items) => items,
            Value::Str(s) => s
                .split(separator)
                .map(|part| Value::Str(part.to_string()))
                .collect(),
            other => vec![other],
        };
        items.into_iter().filter(|item| !is_blank(item)).collect()
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Str(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parse the leading number of `text`, `0.0` when there is none.
///
/// `"12px"` is 12, `"-3.5e2 units"` is -350, `"abc"` is 0.
pub fn lenient_f64(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || (end == digits_start + 1 && bytes[digits_start] == b'.') {
        return 0.0;
    }
    // Optional exponent, only if followed by digits
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().unwrap_or(0.0)
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Key marking a JSON object as a structured [`Object`]
pub const KIND_KEY: &str = "$kind";

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(mut map) => {
                let kind = match map.remove(KIND_KEY) {
                    Some(serde_json::Value::String(kind)) => Some(ObjectKind::from_name(&kind)),
                    Some(other) => {
                        // Not a discriminator after all, keep it as data
                        map.insert(KIND_KEY.to_string(), other);
                        None
                    }
                    None => None,
                };
                let fields: BTreeMap<String, Value> = map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect();
                match kind {
                    Some(kind) => Value::Object(Object { kind, fields }),
                    None => Value::Map(fields),
                }
            }
        }
    }
}
