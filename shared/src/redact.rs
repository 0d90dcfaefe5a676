//! PII redaction applied to everything that leaves for the inference provider.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

pub const EMAIL_PLACEHOLDER: &str = "[email]";
pub const PHONE_PLACEHOLDER: &str = "[phone]";

/// Nesting limit for [`redact_deep`]. Deeper branches become `null`.
pub const MAX_REDACT_DEPTH: usize = 12;

/// Object keys that are dropped wherever they appear, compared lowercased.
const PII_KEYS: &[&str] = &[
    "email",
    "e-mail",
    "e_mail",
    "mail",
    "eposta",
    "e-posta",
    "phone",
    "phonenumber",
    "phone_number",
    "telefon",
    "tel",
    "number",
    "gsm",
    "mobile",
    "contact",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}._%+\-]+@[\p{L}\p{N}.\-]+\.\p{L}{2,}").expect("valid email regex")
});

// Optional `+90`/`0090` prefix, optional trunk zero, area code optionally in
// parentheses, then 3-3-2-2 digit groups.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:\+|\b(?:00)?)90[\s.\-]?\(?|\(|\b)0?[1-9]\d{2}\)?[\s.\-]?\d{3}[\s.\-]?\d{2}[\s.\-]?\d{2}\b",
    )
    .expect("valid phone regex")
});

/// Mask email addresses and phone numbers inside free text.
pub fn redact_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let masked = EMAIL_RE.replace_all(input, EMAIL_PLACEHOLDER);
    PHONE_RE.replace_all(&masked, PHONE_PLACEHOLDER).into_owned()
}

pub fn is_pii_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    PII_KEYS.contains(&lowered.as_str())
}

/// Recursively redact a JSON value.
///
/// Strings go through [`redact_text`], objects lose every PII-named key at any
/// depth, and branches nested deeper than [`MAX_REDACT_DEPTH`] collapse to null.
pub fn redact_deep(value: &Value) -> Value {
    redact_at(value, 0)
}

fn redact_at(value: &Value, depth: usize) -> Value {
    if depth > MAX_REDACT_DEPTH {
        return Value::Null;
    }
    match value {
        Value::String(s) => Value::String(redact_text(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_at(v, depth + 1)).collect()),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                if is_pii_key(key) {
                    continue;
                }
                out.insert(key.clone(), redact_at(inner, depth + 1));
            }
            Value::Object(out)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}
