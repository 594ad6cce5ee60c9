//! Filters command - list built-in filter names

use crate::context::{Options, load_config};
use crate::output;
use anyhow::Result;
use tagweave_core::Processor;

pub fn run(json: bool, options: &Options) -> Result<()> {
    let processor = Processor::new(load_config(options)?);
    let names = processor.filters().names();

    if json {
        output::print_json(&serde_json::to_string_pretty(&names)?)?;
    } else {
        for name in &names {
            output::print_text(name)?;
        }
    }
    Ok(())
}
