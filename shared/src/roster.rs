//! Student roster types and the allow-list projection applied before any
//! roster data reaches the inference provider.

use serde::{Deserialize, Deserializer, Serialize};

use crate::redact::redact_text;

/// Closed set of student statuses understood by the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StudentStatus {
    Active,
    Inactive,
}

impl StudentStatus {
    /// Map a wire value (English or Turkish, any case) to a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" | "aktif" => Some(StudentStatus::Active),
            "inactive" | "pasif" => Some(StudentStatus::Inactive),
            _ => None,
        }
    }
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<StudentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => StudentStatus::parse(&s),
        Some(serde_json::Value::Bool(true)) => Some(StudentStatus::Active),
        Some(serde_json::Value::Bool(false)) => Some(StudentStatus::Inactive),
        _ => None,
    })
}

/// A student as supplied by the caller. Deserialize-only: a raw entry can never
/// be serialized into a prompt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "aktif", deserialize_with = "deserialize_status")]
    pub status: Option<StudentStatus>,
    #[serde(default, alias = "lastRecordAtMs")]
    pub last_activity_at_ms: Option<i64>,
}

/// Allow-listed projection of [`RosterEntry`]. This is the only roster shape the
/// prompt composer accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedRosterEntry {
    pub id: String,
    pub name: String,
    pub status: Option<StudentStatus>,
    pub last_activity_at_ms: Option<i64>,
}

impl From<&RosterEntry> for SanitizedRosterEntry {
    fn from(entry: &RosterEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: redact_text(&entry.name),
            status: entry.status,
            last_activity_at_ms: entry.last_activity_at_ms,
        }
    }
}

/// Project every entry down to its allow-listed fields, keeping order.
pub fn sanitize_roster(entries: &[RosterEntry]) -> Vec<SanitizedRosterEntry> {
    entries.iter().map(SanitizedRosterEntry::from).collect()
}
