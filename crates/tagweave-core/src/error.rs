use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a [`DataSource`](crate::source::DataSource) implementation.
///
/// The engine never propagates these out of a render call; the resolver logs
/// them and the failing tag renders empty.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("SOURCE_UNAVAILABLE: {0}")]
    Unavailable(String),

    #[error("SOURCE_RECORD_NOT_FOUND: record {0} does not exist")]
    RecordNotFound(u64),
}

/// Failures reading inlined asset content (SVG files).
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("ASSET_PATH_ESCAPE: location '{location}' resolves outside the asset root")]
    PathEscape { location: String },

    #[error("ASSET_READ_FAILED: '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ASSET_NOT_FOUND: '{0}'")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG_READ_ERROR: failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CONFIG_PARSE_ERROR: {0}")]
    Parse(String),

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
