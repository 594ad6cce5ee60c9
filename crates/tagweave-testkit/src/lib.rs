//! Test utilities for tagweave
//!
//! In-memory collaborators for the engine (data sources, logger, asset
//! store) and fixture helpers shared by the integration tests of the
//! workspace crates.

mod assets;
mod fixtures;
mod logger;
mod source;

pub use assets::MemoryAssets;
pub use fixtures::{row, shop_snapshot, term, write_snapshot};
pub use logger::{LogEntry, RecordingLogger};
pub use source::MemorySource;

use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the project root
///
/// Keeps test files in one gitignored place; the directory is removed when
/// the returned `TempDir` is dropped.
///
/// # Panics
///
/// Panics if the current directory is unavailable or `.tmp/` cannot be
/// created.
pub fn temp_dir_in_workspace() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");
    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}
