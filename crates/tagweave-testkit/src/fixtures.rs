//! Fixture builders

use serde_json::json;
use std::path::{Path, PathBuf};
use tagweave_core::{Object, ObjectKind, Row, Value};

/// Build a loop row from field/value pairs
pub fn row(fields: &[(&str, Value)]) -> Row {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// A taxonomy term object with a link
pub fn term(name: &str, url: &str) -> Value {
    Value::Object(
        Object::new(ObjectKind::Term)
            .with_field("name", name)
            .with_field("slug", name.to_lowercase())
            .with_field("url", url),
    )
}

/// A snapshot file for the CLI: one product record with a repeated field
pub fn shop_snapshot() -> serde_json::Value {
    json!({
        "records": {
            "1": {
                "native": {
                    "title": "Hello",
                    "date": "2026-01-15"
                },
                "custom": {
                    "price": 75,
                    "sale_price": 19.5,
                    "subtitle": "",
                    "stock": "0",
                    "logo": {
                        "$kind": "attachment",
                        "url": "/uploads/logo.svg",
                        "path": "uploads/logo.svg",
                        "mime_type": "image/svg+xml"
                    },
                    "topics": [
                        { "$kind": "term", "name": "News", "url": "/topic/news" },
                        { "$kind": "term", "name": "Sport", "url": "/topic/sport" }
                    ],
                    "team": [
                        { "name": "A", "role": "lead" },
                        { "name": "B", "role": "dev" }
                    ]
                },
                "meta": {
                    "custom": {
                        "price": { "label": "Price (EUR)", "kind": "number" }
                    }
                }
            },
            "2": {
                "native": { "title": "Second" },
                "custom": { "price": 150 }
            }
        }
    })
}

/// Write `snapshot` as `data.json` in `dir`
pub fn write_snapshot(dir: &Path, snapshot: &serde_json::Value) -> PathBuf {
    let path = dir.join("data.json");
    let content = serde_json::to_string_pretty(snapshot).expect("snapshot serializes");
    std::fs::write(&path, content).expect("Failed to write snapshot");
    path
}
