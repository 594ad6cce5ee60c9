//! In-memory asset store

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tagweave_core::{AssetError, AssetStore};

/// Asset store serving file contents from a map keyed by location
#[derive(Debug, Default)]
pub struct MemoryAssets {
    files: BTreeMap<String, String>,
    reads: AtomicUsize,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, location: &str, content: &str) -> Self {
        self.files.insert(location.to_string(), content.to_string());
        self
    }

    /// Successful and failed reads so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl AssetStore for MemoryAssets {
    fn read_text(&self, location: &str) -> Result<String, AssetError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(location.to_string()))
    }
}
