//! CLI command structure using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tagweave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration (defaults to ./tagweave.toml when present)
    #[arg(long, global = true, env = "TAGWEAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory used to inline SVG attachments
    #[arg(long, global = true, env = "TAGWEAVE_ASSETS")]
    pub assets: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template file for one record
    Render {
        /// Template file, `-` reads stdin
        template: PathBuf,

        /// JSON data snapshot
        #[arg(long)]
        data: PathBuf,

        #[arg(long, default_value_t = 1)]
        record: u64,
    },

    /// Render an item template once per row of a repeated field
    Loop {
        /// Item template file
        item: PathBuf,

        #[arg(long)]
        data: PathBuf,

        /// Custom field holding the rows
        #[arg(long)]
        rows: String,

        /// Template rendered once before the rows
        #[arg(long)]
        header: Option<PathBuf>,

        /// Template rendered once after the rows
        #[arg(long)]
        footer: Option<PathBuf>,

        #[arg(long, default_value_t = 1)]
        record: u64,
    },

    /// Evaluate a single condition, e.g. `%custom:stock% > 0`
    Check {
        condition: String,

        #[arg(long)]
        data: PathBuf,

        #[arg(long, default_value_t = 1)]
        record: u64,
    },

    /// List the fields available as tags
    Fields {
        #[arg(long)]
        data: PathBuf,

        /// Only fields set on this record
        #[arg(long)]
        record: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// List registered filter names
    Filters {
        #[arg(long)]
        json: bool,
    },
}
