//! Captured failures carried by table metadata.
//!
//! Reconciliation and load problems are never raised to callers walking a
//! catalog; they are recorded on the owning
//! [`TableMetadata`](crate::metadata::TableMetadata) instead. The list is
//! append-only, so an earlier failure is never hidden by a later one.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Which stage produced a captured failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// `metadata.json` was missing or could not be decoded.
    MetadataLoad,
    /// `data.parquet` existed but could not be read.
    DataLoad,
    /// The data payload did not fit the declared schema.
    Reconcile,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MetadataLoad => write!(f, "metadata load"),
            FailureKind::DataLoad => write!(f, "data load"),
            FailureKind::Reconcile => write!(f, "reconcile"),
        }
    }
}

/// One captured failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Stage that failed.
    pub kind: FailureKind,
    /// Rendered error message.
    pub message: String,
}

impl FailureRecord {
    /// Capture `error` under `kind`.
    pub fn new(kind: FailureKind, error: impl fmt::Display) -> Self {
        FailureRecord {
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}

/// Serde helper: `exception` may be missing, `null`, or a list.
pub(crate) fn deserialize_failures<'de, D>(deserializer: D) -> Result<Vec<FailureRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FailureRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_renders_kind_and_message() {
        let rec = FailureRecord::new(FailureKind::Reconcile, "missing column flux");
        assert_eq!(rec.to_string(), "reconcile failure: missing column flux");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::MetadataLoad).unwrap();
        assert_eq!(json, "\"metadata_load\"");
    }
}
