//! Loop command - header, one item per row, footer

use crate::context::{Context, Options, read_template};
use crate::output;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tagweave_core::{LoopTemplate, RecordId};

pub struct LoopArgs {
    pub item: PathBuf,
    pub rows: String,
    pub header: Option<PathBuf>,
    pub footer: Option<PathBuf>,
}

pub fn run(args: LoopArgs, data: &Path, record: u64, options: &Options) -> Result<()> {
    let ctx = Context::new(data, options)?;
    let record = RecordId(record);
    ctx.require_record(record)?;

    let mut template = LoopTemplate::new(read_template(&args.item)?);
    if let Some(header) = &args.header {
        template = template.with_header(read_template(header)?);
    }
    if let Some(footer) = &args.footer {
        template = template.with_footer(read_template(footer)?);
    }

    let rows = ctx.snapshot.rows(&args.rows, record)?;
    tracing::debug!(rows = rows.len(), "Rendering '{}'", args.rows);

    let rendered = ctx.processor.render_loop(&template, &rows, record);
    output::print_rendered(&rendered)?;
    Ok(())
}
