//! Template processor
//!
//! Each render call runs three stages in a fixed order:
//!
//! 1. **Conditionals**: the leftmost complete `[if]...[/if]` block is
//!    replaced by the raw body of its first matching branch, then the scan
//!    starts over. Nested blocks therefore stay untouched text until their
//!    enclosing block has been reduced.
//! 2. **Fallbacks**: every `TAG[fallback]BODY[/fallback]` becomes the tag's
//!    rendered value, or the rendered body when the value is absent.
//! 3. **Tags**: every remaining bare tag is replaced in place.
//!
//! Text produced by stage 2 is final; stage 3 never rescans it.

use crate::blocks::{Branch, count_if_blocks, find_first_if_block};
use crate::condition::Condition;
use crate::config::EngineConfig;
use crate::filters::{FilterCall, FilterRegistry};
use crate::log::{LogLevel, Logger, TracingLogger};
use crate::resolve::{Resolved, Resolver, unwrap_media_library_value};
use crate::source::{AssetStore, DataSource, RecordId, Row};
use crate::tag::{Source, Tag};
use crate::tokenize::{TokenKind, TokenStream};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A repeated-field template: header and footer once, item per row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopTemplate {
    pub header: String,
    pub item: String,
    pub footer: String,
}

impl LoopTemplate {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }
}

/// A field offered to editor autocomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownField {
    pub source: Source,
    pub name: String,
    pub label: String,
}

impl KnownField {
    /// The tag that reads this field, e.g. `%custom:price%`
    pub fn tag_text(&self) -> String {
        format!("%{}:{}%", self.source, self.name)
    }
}

/// The template engine.
///
/// Holds data sources, the filter registry and configuration. Rendering
/// takes `&self`; all per-call state lives in the call.
pub struct Processor {
    sources: BTreeMap<Source, Arc<dyn DataSource>>,
    assets: Option<Arc<dyn AssetStore>>,
    filters: FilterRegistry,
    logger: Arc<dyn Logger>,
    config: EngineConfig,
}

impl Processor {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            sources: BTreeMap::new(),
            assets: None,
            filters: FilterRegistry::new(),
            logger: Arc::new(TracingLogger),
            config,
        }
    }

    /// Register the data source behind a source keyword
    pub fn with_source(mut self, source: Source, data: Arc<dyn DataSource>) -> Self {
        self.sources.insert(source, data);
        self
    }

    /// Asset store used to inline SVG attachments
    pub fn with_assets(mut self, assets: Arc<dyn AssetStore>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Add or replace a filter; the last registration under a name wins
    pub fn register_filter<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(Value, &FilterCall<'_>) -> Value + Send + Sync + 'static,
    {
        self.filters.register(name, filter);
    }

    /// Render a template for a record
    pub fn process(&self, template: &str, record: impl Into<RecordId>) -> String {
        self.pass(record.into(), None).run(template)
    }

    /// Render one repeated element; `row` answers `%row:...%` tags
    pub fn process_loop_item(&self, template: &str, row: &Row, record: impl Into<RecordId>) -> String {
        self.pass(record.into(), Some(row)).run(template)
    }

    /// Header, every row through the item template, footer
    pub fn render_loop(&self, template: &LoopTemplate, rows: &[Row], record: impl Into<RecordId>) -> String {
        let record = record.into();
        let mut pass = self.pass(record, None);
        let mut output = pass.run(&template.header);
        for row in rows {
            output.push_str(&self.process_loop_item(&template.item, row, record));
        }
        output.push_str(&pass.run(&template.footer));
        output
    }

    /// Evaluate a single condition, e.g. `%custom:stock% > 0`.
    ///
    /// Malformed conditions are false.
    pub fn evaluate_standalone(&self, condition: &str, record: impl Into<RecordId>) -> bool {
        self.pass(record.into(), None).evaluate(condition)
    }

    /// Fields every registered source knows about, grouped by source
    pub fn known_fields(&self, record: Option<RecordId>) -> Vec<KnownField> {
        let mut fields = Vec::new();
        for (source, data) in &self.sources {
            match data.known_fields(record) {
                Ok(found) => fields.extend(found.into_iter().map(|info| KnownField {
                    source: *source,
                    name: info.name,
                    label: info.label,
                })),
                Err(err) => self.logger.log(
                    &format!("Failed to list fields of '{}': {}", source, err),
                    LogLevel::Error,
                ),
            }
        }
        fields
    }

    fn pass<'p>(&'p self, record: RecordId, row: Option<&'p Row>) -> Pass<'p> {
        let mut resolver = Resolver::new(
            &self.sources,
            self.assets.as_deref(),
            self.logger.as_ref(),
            &self.config,
        );
        if let Some(row) = row {
            resolver = resolver.with_row(row);
        }
        Pass {
            processor: self,
            resolver,
            record,
        }
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<Source> = self.sources.keys().copied().collect();
        f.debug_struct("Processor")
            .field("sources", &sources)
            .field("assets", &self.assets.is_some())
            .field("filters", &self.filters)
            .field("config", &self.config)
            .finish()
    }
}

/// Output of the fallback stage
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Template text still holding bare tags
    Text(String),
    /// Final text from a fallback block
    Resolved(String),
}

/// State of one render call
struct Pass<'p> {
    processor: &'p Processor,
    resolver: Resolver<'p>,
    record: RecordId,
}

impl Pass<'_> {
    fn run(&mut self, template: &str) -> String {
        if !template.contains(['%', '[']) {
            return template.to_string();
        }
        let reduced = self.resolve_conditionals(template);
        let segments = self.resolve_fallbacks(&reduced);
        self.substitute_tags(segments)
    }

    fn resolve_conditionals(&mut self, template: &str) -> String {
        let max = self.processor.config.max_reductions;
        let mut text = template.to_string();
        let mut remaining = count_if_blocks(&text);
        let mut reductions = 0;

        loop {
            let Some(block) = find_first_if_block(&text) else {
                break;
            };
            if reductions == max {
                self.log(
                    &format!("Conditional reduction limit ({}) reached, remaining blocks left as text", max),
                    LogLevel::Warning,
                );
                break;
            }

            let (start, end) = (block.start, block.end);
            let chosen = self.choose_branch(&block.branches).to_string();
            let mut next = String::with_capacity(text.len());
            next.push_str(&text[..start]);
            next.push_str(&chosen);
            next.push_str(&text[end..]);

            let left = count_if_blocks(&next);
            if left >= remaining {
                self.log("Conditional reduction made no progress, stopping", LogLevel::Warning);
                break;
            }
            remaining = left;
            reductions += 1;
            text = next;
        }

        text
    }

    /// Body of the first branch whose condition holds, `""` if none
    fn choose_branch<'b>(&mut self, branches: &[Branch<'b>]) -> &'b str {
        for branch in branches {
            match branch.condition {
                None => return branch.body,
                Some(condition) if self.evaluate(condition) => return branch.body,
                Some(_) => {}
            }
        }
        ""
    }

    fn resolve_fallbacks(&mut self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut last = 0;

        for token in TokenStream::new(text) {
            let (start, end) = (token.start, token.end());
            let TokenKind::Fallback { tag, body } = token.kind else {
                continue;
            };
            if start > last {
                segments.push(Segment::Text(text[last..start].to_string()));
            }
            let value = self.run(&tag);
            let resolved = if is_absent(&value) { self.run(&body) } else { value };
            segments.push(Segment::Resolved(resolved));
            last = end;
        }

        if last < text.len() {
            segments.push(Segment::Text(text[last..].to_string()));
        }
        segments
    }

    fn substitute_tags(&mut self, segments: Vec<Segment>) -> String {
        let mut output = String::new();
        for segment in segments {
            match segment {
                Segment::Resolved(text) => output.push_str(&text),
                Segment::Text(text) => {
                    let mut last = 0;
                    for token in TokenStream::new(&text) {
                        let TokenKind::Tag { tag, .. } = &token.kind else {
                            continue;
                        };
                        output.push_str(&text[last..token.start]);
                        output.push_str(&self.render_tag(tag));
                        last = token.end();
                    }
                    output.push_str(&text[last..]);
                }
            }
        }
        output
    }

    /// Resolve, filter and render one tag
    fn render_tag(&mut self, tag: &Tag) -> String {
        let Resolved { value, terms } = self.resolver.resolve_tag(tag, self.record);
        let config = &self.processor.config;
        let value = self.processor.filters.apply(
            value,
            &tag.filters,
            terms.as_deref(),
            config,
            self.processor.logger.as_ref(),
        );
        let value = unwrap_media_library_value(value);
        match value.to_text(&config.list_separator) {
            Some(text) => text,
            None => {
                self.log(
                    &format!("Tag '{}' resolved to a composite value, rendered empty", tag),
                    LogLevel::Debug,
                );
                String::new()
            }
        }
    }

    fn evaluate(&mut self, text: &str) -> bool {
        let Some(condition) = Condition::parse(text) else {
            self.log(&format!("Malformed condition '{}' evaluates to false", text), LogLevel::Debug);
            return false;
        };
        let rendered = self.render_tag(&condition.tag);
        condition.holds_for(&rendered)
    }

    fn log(&self, message: &str, level: LogLevel) {
        self.processor.logger.log(message, level);
    }
}

/// Rendered values that make a fallback body apply; `"0"` is present
fn is_absent(rendered: &str) -> bool {
    let trimmed = rendered.trim();
    trimmed.is_empty() || trimmed == "false" || trimmed == "null"
}

#[cfg(test)]
mod tests;
