//! Page scripts for capturing and replaying web-storage snapshots.
//!
//! Snapshots stay JSON-encoded strings end to end: `JSON.stringify` output is
//! stored verbatim in the session record and handed back to `JSON.parse` on
//! restore, so key/value pairs survive the round trip untouched.

use std::fmt;

/// The two per-origin storage areas a session carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Session,
}

impl StorageArea {
    fn js_object(self) -> &'static str {
        match self {
            StorageArea::Local => "window.localStorage",
            StorageArea::Session => "window.sessionStorage",
        }
    }
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageArea::Local => f.write_str("localStorage"),
            StorageArea::Session => f.write_str("sessionStorage"),
        }
    }
}

/// Expression evaluating to the area's contents as one JSON-encoded string.
pub fn capture_script(area: StorageArea) -> String {
    format!(
        "JSON.stringify(Object.fromEntries(Object.entries({})))",
        area.js_object()
    )
}

/// Script replaying a captured snapshot into the given area.
///
/// The snapshot is embedded as a string literal and parsed in the page, so
/// arbitrary keys and values replay without extra escaping rules. Returns the
/// number of entries written.
pub fn restore_script(area: StorageArea, snapshot: &str) -> String {
    format!(
        "((raw) => {{ const entries = JSON.parse(raw); for (const [key, value] of Object.entries(entries)) {{ {}.setItem(key, value); }} return Object.keys(entries).length; }})({})",
        area.js_object(),
        js_string_literal(snapshot)
    )
}

/// Encodes a Rust string as a JavaScript string literal. JSON string escaping
/// is a subset of JS, so the serde encoder is sufficient.
fn js_string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}
