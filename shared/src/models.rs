//! Request and response payloads for the assistant endpoints.

use serde::{Deserialize, Deserializer, Serialize};

use crate::roster::RosterEntry;

/// Instruction language. Unknown values fall back to Turkish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Tr,
    En,
}

impl Locale {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "en" => Locale::En,
            _ => Locale::Tr,
        }
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Locale::parse).unwrap_or_default())
    }
}

/// Body of the student search call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query_text: Option<String>,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub students: Option<Vec<RosterEntry>>,
}

/// Result of the student search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub ids: Vec<String>,
    pub reason: String,
}

/// Body of the fitness comment call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessCommentRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub goal: Option<String>,
    /// Must be a JSON object; checked by the endpoint so that a missing value
    /// and a wrongly typed one produce the same invalid-argument error.
    #[serde(default)]
    pub measurements: Option<serde_json::Value>,
    #[serde(default)]
    pub question: Option<String>,
}

/// Result of the fitness comment call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessCommentResponse {
    pub summary: String,
    pub warnings: Vec<String>,
    pub next_steps: Vec<String>,
    pub tags: Vec<String>,
}
