//! JSON text components flattened to legacy formatting codes

use serde_json::Value;

use crate::color::{ChatFormat, AMPERSAND_SYMBOL, SECTION_SYMBOL};

const STYLE_FLAGS: [(&str, ChatFormat); 5] = [
    ("bold", ChatFormat::Bold),
    ("italic", ChatFormat::Italic),
    ("underlined", ChatFormat::Underline),
    ("strikethrough", ChatFormat::Strikethrough),
    ("obfuscated", ChatFormat::Obfuscated),
];

/// NBT-style truthiness: booleans, non-zero numbers, `"1b"`, `"true"`, `"1"`.
/// `None` when the value says nothing either way.
pub fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "1b" => Some(true),
            "false" | "0" | "0b" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn is_set(component: &serde_json::Map<String, Value>, key: &str) -> bool {
    component.get(key).and_then(truthy).unwrap_or(false)
}

/// Color and style codes for one component part, followed by its text
fn push_part(out: &mut String, component: &serde_json::Map<String, Value>) {
    let text = component.get("text").and_then(Value::as_str).unwrap_or_default();

    if let Some(color) = component.get("color").and_then(Value::as_str).and_then(ChatFormat::by_name) {
        if color.is_color() {
            out.push_str(&color.legacy());
        }
    }
    for (key, format) in STYLE_FLAGS {
        if is_set(component, key) {
            out.push_str(&format.legacy());
        }
    }
    out.push_str(text);
}

/// Flatten a component (object, array, plain string, or a string holding
/// serialized JSON) into one line of legacy text.
pub fn to_legacy(value: &Value) -> String {
    let mut out = String::new();
    append(&mut out, value);
    out.replace(SECTION_SYMBOL, &AMPERSAND_SYMBOL.to_string())
}

fn append(out: &mut String, value: &Value) {
    match value {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_) | Value::String(_))) => append(out, &parsed),
            _ => out.push_str(raw),
        },
        Value::Array(parts) => parts.iter().for_each(|part| append(out, part)),
        Value::Object(component) => {
            push_part(out, component);
            if let Some(Value::Array(extra)) = component.get("extra") {
                extra.iter().for_each(|part| append(out, part));
            }
        }
        _ => {}
    }
}
