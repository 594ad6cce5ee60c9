//! tagweave-core - field-tag template engine
//!
//! Scans text for `%source:field.property|filter(args)%` tags, resolves them
//! against pluggable data sources, runs filter chains and evaluates inline
//! `[if:...]...[/if]` and `[fallback]` blocks.
//!
//! ## Syntax
//!
//! - Tags: `%native:title%`, `%custom:price|number_format(2)%`
//! - Property access: `%custom:image.url%`, metadata label: `%custom:price.label%`
//! - Conditionals: `[if:%custom:price% > 100]...[elseif:...]...[else]...[/if]`
//! - Fallbacks: `%custom:subtitle%[fallback]No subtitle[/fallback]`
//!
//! Rendering never fails: missing data renders empty, unknown filters pass
//! values through, malformed conditions are false. Diagnostics go to the
//! injected [`Logger`].

pub mod blocks;
pub mod condition;
pub mod config;
pub mod error;
pub mod filters;
pub mod log;
pub mod processor;
pub mod resolve;
pub mod source;
pub mod tag;
pub mod tokenize;
pub mod value;

// Re-export commonly used types
pub use condition::{Condition, Operator};
pub use config::EngineConfig;
pub use error::{AssetError, ConfigError, SourceError};
pub use filters::{FilterCall, FilterFn, FilterRegistry};
pub use log::{LogLevel, Logger, TracingLogger};
pub use processor::{KnownField, LoopTemplate, Processor};
pub use resolve::{inline_vector_content, unwrap_media_library_value};
pub use source::{AssetStore, DataSource, FieldInfo, FieldMetadata, FsAssetStore, RecordId, Row};
pub use tag::{FilterInvocation, Source, Tag};
pub use value::{Object, ObjectKind, Value};
