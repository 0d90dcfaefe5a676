//! Per-request correlation identifiers.

use chrono::Utc;
use uuid::Uuid;

/// Opaque token linking a caller-visible error to server-side log lines.
///
/// Format is `<unix millis in hex>-<8 random hex chars>`, so ids sort roughly by
/// creation time and stay unique across concurrent invocations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(String);

impl TraceId {
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{:x}-{}", millis, &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TraceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let id = TraceId::generate();
        let (time, suffix) = id.as_str().split_once('-').unwrap();
        assert!(i64::from_str_radix(time, 16).is_ok());
        assert_eq!(suffix.len(), 8);
    }

    #[test]
    fn test_generate_unique() {
        assert_ne!(TraceId::generate(), TraceId::generate());
    }
}
