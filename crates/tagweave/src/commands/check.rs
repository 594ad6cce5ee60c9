//! Check command - evaluate one condition
//!
//! Prints `true` or `false`; malformed conditions print `false`.
//! Always exits 0 once the data loaded.

use crate::context::{Context, Options};
use crate::output;
use anyhow::Result;
use std::path::Path;
use tagweave_core::RecordId;

pub fn run(condition: &str, data: &Path, record: u64, options: &Options) -> Result<()> {
    let ctx = Context::new(data, options)?;
    let record = RecordId(record);
    ctx.require_record(record)?;

    let holds = ctx.processor.evaluate_standalone(condition, record);
    output::print_text(if holds { "true" } else { "false" })?;
    Ok(())
}
