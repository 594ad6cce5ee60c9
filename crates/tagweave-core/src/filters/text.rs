//! String filters: case, trimming, truncation, replacement, booleans

use super::{FilterCall, Table, insert, map_text};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("html tag pattern is valid"));

pub(super) fn register(table: &mut Table) {
    insert(table, "upper", |v, _| map_text(v, &|s| s.to_uppercase()));
    insert(table, "lower", |v, _| map_text(v, &|s| s.to_lowercase()));
    insert(table, "capitalize", |v, _| map_text(v, &capitalize));
    insert(table, "title", |v, _| map_text(v, &title_case));
    insert(table, "trim", |v, _| map_text(v, &|s| s.trim().to_string()));
    insert(table, "strip_tags", |v, _| map_text(v, &strip_tags));
    insert(table, "nl2br", |v, _| map_text(v, &|s| s.replace('\n', "<br />\n")));
    insert(table, "truncate", truncate_filter);
    insert(table, "replace", |v, call| {
        let from = call.arg_or(0, "");
        if from.is_empty() {
            return v;
        }
        let to = call.arg_or(1, "");
        map_text(v, &|s| s.replace(from, to))
    });
    insert(table, "prepend", |v, call| {
        let prefix = call.arg_or(0, "");
        map_whole(v, call, &|s| format!("{prefix}{s}"))
    });
    insert(table, "append", |v, call| {
        let suffix = call.arg_or(0, "");
        map_whole(v, call, &|s| format!("{s}{suffix}"))
    });
    insert(table, "default", default_filter);
    insert(table, "boolean", |v, call| Value::Bool(is_truthy(&v, call)));
    insert(table, "yes_no", |v, call| {
        let text = if is_truthy(&v, call) {
            call.arg_or(0, "Yes")
        } else {
            call.arg_or(1, "No")
        };
        Value::from(text)
    });
}

/// Upper-case the first character, leave the rest alone
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-case the first character of every whitespace-separated word
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start && !c.is_whitespace() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

pub(crate) fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Truncate tag-stripped text to `n` characters, appending the ellipsis
fn truncate_filter(value: Value, call: &FilterCall<'_>) -> Value {
    let Some(limit) = call.arg_usize(0) else {
        return value;
    };
    let Some(text) = value.to_text(call.separator()) else {
        return value;
    };
    let ellipsis = call.arg_or(1, &call.config.ellipsis);
    let plain = strip_tags(&text);
    let plain = plain.trim();

    if plain.chars().count() <= limit {
        return Value::from(plain);
    }
    let cut: String = plain.chars().take(limit).collect();
    Value::from(format!("{}{}", cut.trim_end(), ellipsis))
}

/// Apply `f` to the rendered text of the whole value; empty values stay empty
fn map_whole(value: Value, call: &FilterCall<'_>, f: &dyn Fn(&str) -> String) -> Value {
    match value.to_text(call.separator()) {
        Some(text) if !text.is_empty() => Value::Str(f(&text)),
        Some(_) => Value::Str(String::new()),
        None => value,
    }
}

fn default_filter(value: Value, call: &FilterCall<'_>) -> Value {
    let empty = match &value {
        Value::Null => true,
        Value::Bool(b) => !b,
        other => other
            .to_text(call.separator())
            .is_some_and(|text| text.trim().is_empty()),
    };
    if empty {
        Value::from(call.arg_or(0, ""))
    } else {
        value
    }
}

/// Boolean reading of a value: true/1/yes/on and configured locale words
pub(crate) fn is_truthy(value: &Value, call: &FilterCall<'_>) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Str(s) => call.config.is_truthy_word(s),
        Value::List(items) => !items.is_empty(),
        Value::Null | Value::Map(_) | Value::Object(_) => false,
    }
}
