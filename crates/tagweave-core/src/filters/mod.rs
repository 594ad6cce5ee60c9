//! Filter registry
//!
//! Filters are named value transformations applied left to right after a
//! tag is resolved. The built-in table is shared and immutable; each
//! registry owns an overlay of custom filters registered at runtime, which
//! shadows built-ins of the same name (last registration wins).

mod date;
mod list;
mod number;
mod text;

use crate::config::EngineConfig;
use crate::log::{LogLevel, Logger};
use crate::tag::FilterInvocation;
use crate::value::{Object, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

pub use date::format_php_date;
pub use number::number_format;

/// A filter implementation
pub type FilterFn = Arc<dyn Fn(Value, &FilterCall<'_>) -> Value + Send + Sync>;

type Table = HashMap<&'static str, FilterFn>;

static BUILTINS: LazyLock<Arc<Table>> = LazyLock::new(|| {
    let mut table = Table::new();
    text::register(&mut table);
    number::register(&mut table);
    date::register(&mut table);
    list::register(&mut table);
    Arc::new(table)
});

/// Everything a filter sees besides the incoming value
#[derive(Debug, Clone, Copy)]
pub struct FilterCall<'a> {
    /// Filter name as written in the tag
    pub name: &'a str,
    /// Positional arguments, unquoted
    pub args: &'a [String],
    /// Raw taxonomy terms behind the value, when the tag resolved to terms
    pub terms: Option<&'a [Object]>,
    pub config: &'a EngineConfig,
}

impl<'a> FilterCall<'a> {
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn arg_or(&self, index: usize, default: &'a str) -> &'a str {
        self.arg(index).unwrap_or(default)
    }

    /// Argument parsed as a non-negative integer
    pub fn arg_usize(&self, index: usize) -> Option<usize> {
        self.arg(index).and_then(|a| a.trim().parse().ok())
    }

    /// The configured list separator
    pub fn separator(&self) -> &'a str {
        &self.config.list_separator
    }
}

fn insert<F>(table: &mut Table, name: &'static str, filter: F)
where
    F: Fn(Value, &FilterCall<'_>) -> Value + Send + Sync + 'static,
{
    table.insert(name, Arc::new(filter));
}

/// Name → filter table: shared built-ins plus an owned overlay
#[derive(Clone)]
pub struct FilterRegistry {
    builtins: Arc<Table>,
    custom: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    /// Registry with the built-in filters and no custom ones
    pub fn new() -> Self {
        Self {
            builtins: Arc::clone(&BUILTINS),
            custom: HashMap::new(),
        }
    }

    /// Add or replace a filter
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(Value, &FilterCall<'_>) -> Value + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Arc::new(filter));
    }

    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.custom.get(name).or_else(|| self.builtins.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All filter names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .builtins
            .keys()
            .map(|k| k.to_string())
            .chain(self.custom.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Run a filter chain left to right.
    ///
    /// Unknown names are logged and skipped; the value passes through
    /// unchanged and the rest of the chain still runs.
    pub fn apply(
        &self,
        value: Value,
        chain: &[FilterInvocation],
        terms: Option<&[Object]>,
        config: &EngineConfig,
        logger: &dyn Logger,
    ) -> Value {
        chain.iter().fold(value, |value, invocation| {
            match self.get(&invocation.name) {
                Some(filter) => {
                    let call = FilterCall {
                        name: &invocation.name,
                        args: &invocation.args,
                        terms,
                        config,
                    };
                    filter(value, &call)
                }
                None => {
                    logger.log(
                        &format!("Unknown filter '{}', value passed through", invocation.name),
                        LogLevel::Warning,
                    );
                    value
                }
            }
        })
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<&String> = self.custom.keys().collect();
        custom.sort();
        f.debug_struct("FilterRegistry")
            .field("builtins", &self.builtins.len())
            .field("custom", &custom)
            .finish()
    }
}

/// Apply `f` to the text of a scalar, or to each scalar entry of a list.
///
/// Null stays null, composites pass through untouched.
pub(crate) fn map_text(value: Value, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::List(items) => Value::List(items.into_iter().map(|item| map_text(item, f)).collect()),
        Value::Map(_) | Value::Object(_) => value,
        scalar => match scalar.scalar_text() {
            Some(text) => Value::Str(f(&text)),
            None => scalar,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogLevel;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Captured(Mutex<Vec<(LogLevel, String)>>);

    impl Logger for Captured {
        fn log(&self, message: &str, level: LogLevel) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    fn chain(steps: &[(&str, &[&str])]) -> Vec<FilterInvocation> {
        steps.iter()
            .map(|(name, args)| {
                FilterInvocation::new(*name, args.iter().map(|a| a.to_string()).collect())
            })
            .collect()
    }

    fn run(value: impl Into<Value>, steps: &[(&str, &[&str])]) -> Value {
        FilterRegistry::new().apply(
            value.into(),
            &chain(steps),
            None,
            &EngineConfig::default(),
            &Captured::default(),
        )
    }

    #[test]
    fn test_chain_applies_left_to_right() {
        let out = run("hello world", &[("upper", &[]), ("truncate", &["5"])]);
        assert_eq!(out, Value::from("HELLO..."));
    }

    #[test]
    fn test_unknown_filter_is_noop_and_logged() {
        let logger = Captured::default();
        let out = FilterRegistry::new().apply(
            Value::from("abc"),
            &chain(&[("upper", &[]), ("sparkle", &[]), ("append", &["!"])]),
            None,
            &EngineConfig::default(),
            &logger,
        );
        assert_eq!(out, Value::from("ABC!"));
        let logged = logger.0.lock().unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, LogLevel::Warning);
        assert!(logged[0].1.contains("sparkle"));
    }

    #[test]
    fn test_register_overrides_builtin_last_wins() {
        let mut registry = FilterRegistry::new();
        registry.register("upper", |_, _| Value::from("first"));
        registry.register("upper", |_, _| Value::from("second"));
        let out = registry.apply(
            Value::from("x"),
            &chain(&[("upper", &[])]),
            None,
            &EngineConfig::default(),
            &Captured::default(),
        );
        assert_eq!(out, Value::from("second"));
        // Built-in table is untouched for other registries
        assert_eq!(run("x", &[("upper", &[])]), Value::from("X"));
    }

    #[test]
    fn test_custom_filter_receives_args() {
        let mut registry = FilterRegistry::new();
        registry.register("repeat", |value, call| {
            let times = call.arg_usize(0).unwrap_or(1);
            Value::from(value.render(call.separator()).repeat(times))
        });
        let out = registry.apply(
            Value::from("ab"),
            &chain(&[("repeat", &["3"])]),
            None,
            &EngineConfig::default(),
            &Captured::default(),
        );
        assert_eq!(out, Value::from("ababab"));
    }

    #[test]
    fn test_names_include_builtins_and_custom() {
        let mut registry = FilterRegistry::new();
        registry.register("zz_custom", |v, _| v);
        let names = registry.names();
        assert!(names.contains(&"number_format".to_string()));
        assert!(names.contains(&"zz_custom".to_string()));
        assert!(registry.contains("join"));
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn test_map_text_on_lists() {
        let out = map_text(Value::from(vec!["a", "b"]), &|s| s.to_uppercase());
        assert_eq!(out, Value::from(vec!["A", "B"]));
        assert_eq!(map_text(Value::Null, &|s| s.to_uppercase()), Value::Null);
    }
}
