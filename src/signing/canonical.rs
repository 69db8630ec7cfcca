//! Canonical ("stable") JSON serialization.
//!
//! Object keys are sorted at every nesting level, arrays keep their order and
//! scalars are written as standard compact JSON. Two values that are deeply
//! equal always produce the same bytes, whatever order their keys were
//! inserted in.

use serde_json::{Map, Number, Value};

/// Serialize a JSON value with keys sorted at every level.
pub fn stable_stringify(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out),
        Value::Number(n) => out.push_str(&format_number(n)),
        // null, booleans and strings already serialize compactly
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_object(map: &Map<String, Value>, out: &mut String) {
    // Browser clients sort keys by UTF-16 code units, not by bytes.
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::String(key.clone()).to_string());
        out.push(':');
        write_value(value, out);
    }
    out.push('}');
}

/// Integral floats below 1e21 are written without a fractional part, the way
/// JavaScript's number formatting does (`100.0` → `100`, `-0.0` → `0`).
/// Render a number the way JavaScript does: integral floats below 1e21
/// drop the fraction and `-0` prints as `0`.
pub fn format_number(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e21 {
                return if f == 0.0 { "0".to_string() } else { format!("{}", f) };
            }
        }
    }
    n.to_string()
}
