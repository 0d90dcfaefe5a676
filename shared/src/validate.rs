//! Loose parsing and validation of raw model output.
//!
//! Parsing never fails: anything that does not look like a JSON object becomes
//! an empty object. Deciding what the object is worth is left to the
//! validators, which only ever narrow what the model returned.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{FitnessCommentResponse, Locale};
use crate::prompt::{MAX_COMMENT_ITEMS, MAX_RESULT_IDS};

// First `{` through last `}`, across lines.
static OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object regex"));

pub const COMMENT_FALLBACK_TR: &str = "Yorum oluşturulamadı. Lütfen daha sonra tekrar deneyin.";
pub const COMMENT_FALLBACK_EN: &str = "Could not generate a comment. Please try again later.";

/// Best-effort parse of model output into a JSON object.
pub fn parse_json_loose(raw: &str) -> Map<String, Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Map::new();
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return map;
    }
    OBJECT_RE
        .find(raw)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

/// Keep only string ids that belong to `allowed`, first occurrence wins,
/// capped at [`MAX_RESULT_IDS`].
pub fn validate_ids(parsed: &Map<String, Value>, allowed: &HashSet<&str>) -> Vec<String> {
    let Some(Value::Array(items)) = parsed.get("ids") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|id| allowed.contains(id))
        .filter(|id| seen.insert(*id))
        .take(MAX_RESULT_IDS)
        .map(str::to_string)
        .collect()
}

/// The model's `reason`, or an empty string when missing or not a string.
pub fn validate_reason(parsed: &Map<String, Value>) -> String {
    parsed
        .get("reason")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub fn comment_fallback(locale: Locale) -> &'static str {
    match locale {
        Locale::Tr => COMMENT_FALLBACK_TR,
        Locale::En => COMMENT_FALLBACK_EN,
    }
}

fn string_list(parsed: &Map<String, Value>, key: &str) -> Vec<String> {
    let Some(Value::Array(items)) = parsed.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_COMMENT_ITEMS)
        .map(str::to_string)
        .collect()
}

pub fn validate_comment(parsed: &Map<String, Value>, locale: Locale) -> FitnessCommentResponse {
    let summary = parsed
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| comment_fallback(locale))
        .to_string();

    FitnessCommentResponse {
        summary,
        warnings: string_list(parsed, "warnings"),
        next_steps: string_list(parsed, "nextSteps"),
        tags: string_list(parsed, "tags"),
    }
}
