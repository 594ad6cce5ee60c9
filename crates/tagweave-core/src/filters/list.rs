//! Multi-value filters
//!
//! Incoming values that are not lists are split on the list separator;
//! null and empty entries are dropped. Results stay lists (rendered with
//! the list separator) unless the filter joins them explicitly.

use super::{FilterCall, Table, insert};
use crate::value::{Object, ObjectKind, Value};

pub(super) fn register(table: &mut Table) {
    insert(table, "limit", |v, call| {
        match call.arg_usize(0) {
            Some(n) => Value::List(items(v, call).into_iter().take(n).collect()),
            None => v,
        }
    });
    insert(table, "join", |v, call| join(v, call, call.arg_or(0, call.separator())));
    insert(table, "separator", |v, call| join(v, call, call.arg_or(0, call.separator())));
    insert(table, "sort", |v, call| {
        let mut keyed: Vec<(String, Value)> = items(v, call)
            .into_iter()
            .map(|item| (item_text(&item, call), item))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        if matches!(call.arg(0).map(str::to_lowercase).as_deref(), Some("desc" | "reverse")) {
            keyed.reverse();
        }
        Value::List(keyed.into_iter().map(|(_, item)| item).collect())
    });
    insert(table, "exclude", |v, call| {
        let excluded = call.args;
        Value::List(
            items(v, call)
                .into_iter()
                .filter(|item| {
                    let text = item_text(item, call);
                    !excluded.iter().any(|e| e == &text)
                })
                .collect(),
        )
    });
    insert(table, "wrap", |v, call| {
        let prefix = call.arg_or(0, "");
        let suffix = call.arg_or(1, "");
        Value::List(
            items(v, call)
                .into_iter()
                .map(|item| Value::Str(format!("{prefix}{}{suffix}", item_text(&item, call))))
                .collect(),
        )
    });
    insert(table, "first", |v, call| items(v, call).into_iter().next().unwrap_or(Value::Null));
    insert(table, "last", |v, call| items(v, call).pop().unwrap_or(Value::Null));
    insert(table, "count", |v, call| Value::Int(items(v, call).len() as i64));
    insert(table, "pluck", |v, call| {
        let Some(field) = call.arg(0) else {
            return v;
        };
        Value::List(
            items(v, call)
                .into_iter()
                .filter_map(|item| match item {
                    Value::Map(map) => map.get(field).cloned(),
                    Value::Object(object) => object.field(field).cloned(),
                    _ => None,
                })
                .collect(),
        )
    });
    insert(table, "term_links", term_links);
}

fn items(value: Value, call: &FilterCall<'_>) -> Vec<Value> {
    value.into_items(call.separator())
}

/// Text of one entry; objects use their display name
fn item_text(item: &Value, call: &FilterCall<'_>) -> String {
    match item {
        Value::Object(object) => object.display_name().unwrap_or_default().to_string(),
        other => other.render(call.separator()),
    }
}

fn join(value: Value, call: &FilterCall<'_>, separator: &str) -> Value {
    let parts: Vec<String> = items(value, call)
        .iter()
        .map(|item| item_text(item, call))
        .filter(|text| !text.is_empty())
        .collect();
    Value::Str(parts.join(separator))
}

/// Render taxonomy terms as links: `<a href="url">name</a>`.
///
/// Works on the incoming items, so earlier filters (`limit`, `exclude`,
/// `sort`, ...) shape the result. Term objects link directly; plain names
/// link through the raw terms that travelled alongside the value, and stay
/// plain text when no term carries that name. A value without any term
/// passes through.
fn term_links(value: Value, call: &FilterCall<'_>) -> Value {
    let separator = call.arg_or(0, call.separator());
    let entries = items(value.clone(), call);

    let mut linked = false;
    let parts: Vec<String> = entries
        .iter()
        .filter_map(|item| {
            let term = match item {
                Value::Object(object) if object.kind == ObjectKind::Term => Some(object),
                other => {
                    let name = item_text(other, call);
                    call.terms
                        .unwrap_or_default()
                        .iter()
                        .find(|term| term.display_name() == Some(name.as_str()))
                }
            };
            match term {
                Some(term) => {
                    linked = true;
                    term_link(term)
                }
                None => Some(item_text(item, call)).filter(|text| !text.is_empty()),
            }
        })
        .collect();

    if !linked {
        return value;
    }
    Value::Str(parts.join(separator))
}

fn term_link(term: &Object) -> Option<String> {
    let name = term.display_name()?;
    Some(match term.text("url") {
        Some(url) => format!("<a href=\"{}\">{}</a>", url, name),
        None => name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::FilterRegistry;
    use super::*;
    use crate::config::EngineConfig;
    use crate::log::{LogLevel, Logger};
    use crate::tag::FilterInvocation;

    struct Silent;

    impl Logger for Silent {
        fn log(&self, _message: &str, _level: LogLevel) {}
    }

    fn apply_with_terms(name: &str, value: impl Into<Value>, args: &[&str], terms: Option<&[Object]>) -> Value {
        let chain = vec![FilterInvocation::new(
            name,
            args.iter().map(|a| a.to_string()).collect(),
        )];
        FilterRegistry::new().apply(value.into(), &chain, terms, &EngineConfig::default(), &Silent)
    }

    fn apply(name: &str, value: impl Into<Value>, args: &[&str]) -> Value {
        apply_with_terms(name, value, args, None)
    }

    fn render(value: Value) -> String {
        value.render(", ")
    }

    #[test]
    fn test_limit() {
        assert_eq!(render(apply("limit", "a, b, c", &["2"])), "a, b");
        assert_eq!(render(apply("limit", vec!["a", "b"], &["5"])), "a, b");
        assert_eq!(render(apply("limit", "a, b", &["x"])), "a, b");
    }

    #[test]
    fn test_join_and_separator() {
        assert_eq!(apply("join", vec!["a", "b"], &[" | "]), Value::from("a | b"));
        assert_eq!(apply("join", "a, , b", &[]), Value::from("a, b"));
        assert_eq!(apply("separator", "a, b, c", &[" / "]), Value::from("a / b / c"));
        assert_eq!(apply("join", vec!["<li>a</li>", "<li>b</li>"], &[""]), Value::from("<li>a</li><li>b</li>"));
    }

    #[test]
    fn test_sort() {
        assert_eq!(render(apply("sort", "pear, apple, fig", &[])), "apple, fig, pear");
        assert_eq!(render(apply("sort", "pear, apple, fig", &["desc"])), "pear, fig, apple");
        assert_eq!(render(apply("sort", "b, a", &["REVERSE"])), "b, a");
    }

    #[test]
    fn test_exclude() {
        assert_eq!(render(apply("exclude", "red, green, blue", &["green", "blue"])), "red");
    }

    #[test]
    fn test_wrap() {
        let wrapped = apply("wrap", "a, b", &["<li>", "</li>"]);
        assert_eq!(render(wrapped), "<li>a</li>, <li>b</li>");
        let chain = vec![
            FilterInvocation::new("wrap", vec!["[".into(), "]".into()]),
            FilterInvocation::new("join", vec!["".into()]),
        ];
        let out = FilterRegistry::new().apply(Value::from("x, y"), &chain, None, &EngineConfig::default(), &Silent);
        assert_eq!(out, Value::from("[x][y]"));
    }

    #[test]
    fn test_first_last_count() {
        assert_eq!(apply("first", "a, b, c", &[]), Value::from("a"));
        assert_eq!(apply("last", vec!["a", "b", "c"], &[]), Value::from("c"));
        assert_eq!(apply("count", "a, b, , c", &[]), Value::Int(3));
        assert_eq!(apply("count", Value::Null, &[]), Value::Int(0));
        assert_eq!(apply("first", "", &[]), Value::Null);
    }

    #[test]
    fn test_list_filters_drop_nulls() {
        let value = Value::List(vec![Value::from("a"), Value::Null, Value::from(" "), Value::from("b")]);
        assert_eq!(apply("count", value, &[]), Value::Int(2));
    }

    #[test]
    fn test_pluck() {
        let gallery = Value::List(vec![
            Value::Object(Object::new(ObjectKind::Attachment).with_field("url", "/a.jpg")),
            Value::Object(Object::new(ObjectKind::Attachment).with_field("url", "/b.jpg")),
        ]);
        assert_eq!(render(apply("pluck", gallery, &["url"])), "/a.jpg, /b.jpg");
    }

    #[test]
    fn test_term_links_uses_raw_terms() {
        let terms = vec![
            Object::new(ObjectKind::Term)
                .with_field("name", "News")
                .with_field("url", "/category/news"),
            Object::new(ObjectKind::Term).with_field("name", "Plain"),
        ];
        let out = apply_with_terms("term_links", "News, Plain", &[" · "], Some(terms.as_slice()));
        assert_eq!(out, Value::from("<a href=\"/category/news\">News</a> · Plain"));
    }

    fn news_and_sport() -> Vec<Object> {
        vec![
            Object::new(ObjectKind::Term)
                .with_field("name", "News")
                .with_field("url", "/topic/news"),
            Object::new(ObjectKind::Term)
                .with_field("name", "Sport")
                .with_field("url", "/topic/sport"),
        ]
    }

    fn chain_with_terms(value: &str, steps: &[(&str, &[&str])], terms: &[Object]) -> Value {
        let chain: Vec<FilterInvocation> = steps
            .iter()
            .map(|(name, args)| FilterInvocation::new(*name, args.iter().map(|a| a.to_string()).collect()))
            .collect();
        FilterRegistry::new().apply(Value::from(value), &chain, Some(terms), &EngineConfig::default(), &Silent)
    }

    #[test]
    fn test_term_links_follow_earlier_list_filters() {
        let terms = news_and_sport();
        let limited = chain_with_terms("News, Sport", &[("limit", &["1"]), ("term_links", &[])], &terms);
        assert_eq!(limited, Value::from("<a href=\"/topic/news\">News</a>"));

        let excluded = chain_with_terms("News, Sport", &[("exclude", &["News"]), ("term_links", &[])], &terms);
        assert_eq!(excluded, Value::from("<a href=\"/topic/sport\">Sport</a>"));

        let sorted = chain_with_terms("News, Sport", &[("sort", &["desc"]), ("term_links", &[" "])], &terms);
        assert_eq!(
            sorted,
            Value::from("<a href=\"/topic/sport\">Sport</a> <a href=\"/topic/news\">News</a>")
        );
    }

    #[test]
    fn test_term_links_on_term_objects() {
        let value = Value::List(news_and_sport().into_iter().map(Value::Object).collect());
        let out = apply("term_links", value, &[" | "]);
        assert_eq!(
            out,
            Value::from("<a href=\"/topic/news\">News</a> | <a href=\"/topic/sport\">Sport</a>")
        );
    }

    #[test]
    fn test_term_links_without_terms_passes_through() {
        assert_eq!(apply("term_links", "News", &[]), Value::from("News"));
    }
}
