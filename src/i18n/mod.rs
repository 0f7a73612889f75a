//! Text catalogue.
//!
//! All user-facing strings are embedded from `en.json` and resolved by
//! dotted keys, e.g. `"join.prompt"`.

use std::sync::LazyLock;

use serde_json::Value;
use tracing::warn;

static CATALOGUE: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("en.json")).unwrap_or_else(|e| {
        warn!("Failed to parse text catalogue: {}", e);
        Value::Null
    })
});

/// Get text for a key. Falls back to the key itself if missing.
pub fn get_text(key: &str) -> String {
    resolve_key(&CATALOGUE, key).unwrap_or_else(|| key.to_string())
}

/// Get text for a key and substitute `{name}` placeholders.
pub fn get_text_with(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(get_text(key), |text, (name, value)| {
        text.replace(&format!("{{{}}}", name), value)
    })
}

fn resolve_key(val: &Value, key: &str) -> Option<String> {
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    current.as_str().map(|s| s.to_string())
}
