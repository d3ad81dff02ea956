//! Deterministic JSON serialization for hashing.
//!
//! The chain hash must be a pure function of an entry's field values: the
//! same values must produce byte-identical input on every platform and
//! every run, or verification is meaningless. `serde_json::to_vec` is not
//! enough here because the diff payload is caller-supplied `Value` data
//! whose object ordering depends on how it was built.
//!
//! Canonical form:
//! - object keys sorted by byte value, no duplicates survive (last wins);
//! - no whitespace anywhere;
//! - nulls written explicitly as `null` — an absent optional field and a
//!   present-but-null field hash identically only because the entry layer
//!   always writes the key;
//! - strings escaped minimally (`"` `\` and control characters only);
//! - numbers in serde_json's shortest round-trip form.

use std::fmt::Write as _;

use serde_json::Value;

/// Render `value` in canonical form.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => {
            // serde_json renders numbers via itoa/ryu — shortest
            // round-trip form, stable across platforms.
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                // Key came from the map, so the lookup cannot miss.
                if let Some(v) = map.get(*key) {
                    write_value(out, v);
                }
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

// ── Tests ─────────────────────────────────────────────────────────────────────
