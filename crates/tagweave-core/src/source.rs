//! Collaborator interfaces: data sources and asset stores

use crate::error::{AssetError, SourceError};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Identifier of the record a template is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One element of a repeated field, keyed by sub-field name
pub type Row = BTreeMap<String, Value>;

/// Descriptive metadata of a field (used by `.label`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub label: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl FieldMetadata {
    pub fn new(label: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: kind.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Field listing entry for editor autocomplete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub label: String,
}

/// Backing store for one source keyword
pub trait DataSource: Send + Sync {
    /// Value of `field` for `record`, `None` when the field is unset
    fn value(&self, field: &str, record: RecordId) -> Result<Option<Value>, SourceError>;

    /// Metadata of `field`, `None` when unknown
    fn metadata(&self, _field: &str, _record: RecordId) -> Result<Option<FieldMetadata>, SourceError> {
        Ok(None)
    }

    /// All fields this source knows about, optionally narrowed to a record
    fn known_fields(&self, _record: Option<RecordId>) -> Result<Vec<FieldInfo>, SourceError> {
        Ok(Vec::new())
    }
}

/// Textual file access used to inline vector images
pub trait AssetStore: Send + Sync {
    fn read_text(&self, location: &str) -> Result<String, AssetError>;
}

/// Asset store reading files below a root directory.
///
/// Locations may be plain relative paths (`uploads/logo.svg`), absolute
/// paths from the site root (`/uploads/logo.svg`) or full URLs, in which
/// case only the URL path is used.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a location onto a path under the root, rejecting escapes
    pub fn resolve(&self, location: &str) -> Result<PathBuf, AssetError> {
        let without_scheme = match location.split_once("://") {
            Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
            None => location,
        };
        let relative = without_scheme
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .trim_start_matches('/');

        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(AssetError::PathEscape {
                location: location.to_string(),
            });
        }

        Ok(self.root.join(relative))
    }
}

impl AssetStore for FsAssetStore {
    fn read_text(&self, location: &str) -> Result<String, AssetError> {
        let path = self.resolve(location)?;
        if !path.is_file() {
            return Err(AssetError::NotFound(location.to_string()));
        }
        std::fs::read_to_string(&path).map_err(|source| AssetError::Read { path, source })
    }
}
