//! Global context for CLI commands

use crate::snapshot::{Snapshot, SnapshotSource};
use anyhow::{Result, bail};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tagweave_core::{EngineConfig, FsAssetStore, Processor, RecordId, Source};

/// Name of the configuration file picked up from the working directory
pub const CONFIG_FILE: &str = "tagweave.toml";

/// Global flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub assets: Option<PathBuf>,
    pub verbose: bool,
}

/// A processor wired to a data snapshot
pub struct Context {
    pub processor: Processor,
    pub snapshot: Arc<Snapshot>,
}

impl Context {
    /// Load configuration and data and build the processor
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or is invalid
    /// - The data file cannot be read or parsed
    pub fn new(data: &Path, options: &Options) -> Result<Self> {
        let config = load_config(options)?;
        let snapshot = Arc::new(Snapshot::from_file(data)?);

        let mut processor = Processor::new(config);
        for source in [Source::Native, Source::Custom] {
            processor =
                processor.with_source(source, Arc::new(SnapshotSource::new(snapshot.clone(), source)));
        }
        if let Some(root) = &options.assets {
            processor = processor.with_assets(Arc::new(FsAssetStore::new(root)));
        }

        if options.verbose {
            tracing::debug!(
                records = snapshot.record_ids().len(),
                "Loaded data snapshot '{}'",
                data.display()
            );
        }

        Ok(Self {
            processor,
            snapshot,
        })
    }

    /// Fail early for records the snapshot does not hold
    pub fn require_record(&self, record: RecordId) -> Result<()> {
        if !self.snapshot.contains(record) {
            bail!("Record {} not found in data file", record);
        }
        Ok(())
    }
}

/// `--config`, else `./tagweave.toml` when present, else defaults
pub fn load_config(options: &Options) -> Result<EngineConfig> {
    if let Some(path) = &options.config {
        return Ok(EngineConfig::from_file(path)?);
    }
    let default_path = env::current_dir()?.join(CONFIG_FILE);
    if default_path.is_file() {
        return Ok(EngineConfig::from_file(&default_path)?);
    }
    Ok(EngineConfig::default())
}

/// Read a template file, `-` reads stdin
pub fn read_template(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut content)?;
        return Ok(content);
    }
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read template '{}': {}", path.display(), e))
}
