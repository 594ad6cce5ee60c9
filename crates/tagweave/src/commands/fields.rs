//! Fields command - list tags available for autocomplete

use crate::context::{Context, Options};
use crate::output;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tagweave_core::{KnownField, RecordId, Source};

#[derive(Debug, Serialize)]
struct FieldEntry {
    source: String,
    name: String,
    label: String,
    tag: String,
}

impl From<&KnownField> for FieldEntry {
    fn from(field: &KnownField) -> Self {
        Self {
            source: field.source.to_string(),
            name: field.name.clone(),
            label: field.label.clone(),
            tag: field.tag_text(),
        }
    }
}

pub fn run(data: &Path, record: Option<u64>, json: bool, options: &Options) -> Result<()> {
    let ctx = Context::new(data, options)?;
    let record = record.map(RecordId);
    if let Some(id) = record {
        ctx.require_record(id)?;
    }

    let fields = ctx.processor.known_fields(record);

    if json {
        let entries: Vec<FieldEntry> = fields.iter().map(FieldEntry::from).collect();
        output::print_json(&serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if fields.is_empty() {
        output::print_text("No fields found")?;
        return Ok(());
    }

    let mut current: Option<Source> = None;
    for field in &fields {
        if current != Some(field.source) {
            output::print_text(&format!("{}", field.source.keyword().bold()))?;
            current = Some(field.source);
        }
        let tag = field.tag_text();
        if field.label == field.name {
            output::print_text(&format!("  {}", tag.cyan()))?;
        } else {
            output::print_text(&format!("  {}  {}", tag.cyan(), field.label.dimmed()))?;
        }
    }
    Ok(())
}
