//! Render command - one template, one record

use crate::context::{Context, Options, read_template};
use crate::output;
use anyhow::Result;
use std::path::Path;
use tagweave_core::RecordId;

pub fn run(template: &Path, data: &Path, record: u64, options: &Options) -> Result<()> {
    let ctx = Context::new(data, options)?;
    let record = RecordId(record);
    ctx.require_record(record)?;

    let template = read_template(template)?;
    let rendered = ctx.processor.process(&template, record);
    output::print_rendered(&rendered)?;
    Ok(())
}
