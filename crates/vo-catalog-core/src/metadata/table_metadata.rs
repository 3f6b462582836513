//! Table-level metadata persisted as `metadata.json`.
//!
//! A [`TableMetadata`] identifies a catalog table (where it came from, what
//! it is called) and declares its columns. The declared columns are the
//! authority on the table's schema: [`TableMetadata::schema_frame`] builds an
//! empty batch from them and [`TableMetadata::reconcile`] coerces payloads to
//! it.
//!
//! Health is carried as data. A metadata instance with one or more captured
//! [`FailureRecord`]s is unhealthy, but still usable and still named.
use std::{fmt, path::Path, sync::Arc};

use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
use serde::{Deserialize, Deserializer, Serialize};
use snafu::prelude::*;

use crate::{
    fetch::ResourceInfo,
    metadata::{
        failure::{self, FailureKind, FailureRecord},
        field::{FieldDescriptor, FieldMetadata, null_as_empty},
    },
    storage::{self, StorageError},
};

/// Marker placed in name/title/description of a table whose metadata could
/// not be loaded.
pub const LOAD_FAILURE_SENTINEL: &str = "failed to load";

/// Errors raised while encoding, decoding or persisting metadata.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MetadataError {
    /// Serializing the metadata to JSON failed.
    #[snafu(display("Failed to encode table metadata: {source}"))]
    Encode {
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The JSON document is not valid table metadata.
    #[snafu(display("Failed to decode table metadata: {source}"))]
    Decode {
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Reading or writing the metadata file failed.
    #[snafu(display("Storage error while accessing table metadata: {source}"))]
    Storage {
        /// Underlying storage error.
        source: StorageError,
    },
}

impl MetadataError {
    /// True when the metadata file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetadataError::Storage { source } if source.is_not_found())
    }
}

/// Descriptor of one catalog table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    #[serde(default, deserialize_with = "null_as_empty")]
    access_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    description: String,
    #[serde(default, deserialize_with = "deserialize_fields")]
    fields: Vec<FieldMetadata>,
    #[serde(
        rename = "exception",
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "failure::deserialize_failures"
    )]
    failures: Vec<FailureRecord>,
}

impl TableMetadata {
    /// Healthy metadata with the given identity and columns.
    pub fn new(
        access_url: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        fields: Vec<FieldMetadata>,
    ) -> Self {
        TableMetadata {
            access_url: access_url.into(),
            name: name.into(),
            title: title.into(),
            description: description.into(),
            fields,
            failures: Vec::new(),
        }
    }

    /// Degraded metadata for a folder whose `metadata.json` could not be
    /// loaded. Carries the cause as a [`FailureKind::MetadataLoad`] record.
    pub fn load_failure(error: impl fmt::Display) -> Self {
        TableMetadata {
            access_url: String::new(),
            name: LOAD_FAILURE_SENTINEL.to_string(),
            title: LOAD_FAILURE_SENTINEL.to_string(),
            description: LOAD_FAILURE_SENTINEL.to_string(),
            fields: Vec::new(),
            failures: vec![FailureRecord::new(FailureKind::MetadataLoad, error)],
        }
    }

    /// Metadata for a freshly fetched service result.
    pub fn from_service_result(resource: &ResourceInfo, fields: &[FieldDescriptor]) -> Self {
        TableMetadata::new(
            resource.access_url.clone(),
            resource.short_name.clone(),
            resource.title.clone(),
            resource.description.clone(),
            fields.iter().map(FieldMetadata::from_descriptor).collect(),
        )
    }

    /// URL of the service the table was fetched from.
    pub fn access_url(&self) -> &str {
        &self.access_url
    }

    /// Short name of the table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared columns, in column order.
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    /// Captured failures, oldest first.
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    /// True iff no failure has been captured.
    pub fn is_healthy(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn record_failure(&mut self, record: FailureRecord) {
        self.failures.push(record);
    }

    /// Arrow schema declared by [`Self::fields`].
    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::new(Schema::new(
            self.fields
                .iter()
                .map(FieldMetadata::arrow_field)
                .collect::<Vec<_>>(),
        ))
    }

    /// Zero-row batch with one correctly typed column per declared field.
    pub fn schema_frame(&self) -> RecordBatch {
        RecordBatch::new_empty(self.arrow_schema())
    }

    /// Compact JSON encoding.
    pub fn to_json(&self) -> Result<String, MetadataError> {
        serde_json::to_string(self).context(EncodeSnafu)
    }

    /// Indented JSON encoding; this is what [`Self::save`] writes.
    pub fn to_json_pretty(&self) -> Result<String, MetadataError> {
        serde_json::to_string_pretty(self).context(EncodeSnafu)
    }

    /// Decode from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, MetadataError> {
        serde_json::from_str(json).context(DecodeSnafu)
    }

    /// Decode the JSON file at `path`.
    pub fn from_json_file(path: &Path) -> Result<Self, MetadataError> {
        let json = storage::read_to_string(path).context(StorageSnafu)?;
        Self::from_json_str(&json)
    }

    /// Decode either a JSON document or, if the argument ends in `.json`,
    /// the file it names.
    pub fn from_json(json_or_path: &str) -> Result<Self, MetadataError> {
        if json_or_path.ends_with(".json") {
            Self::from_json_file(Path::new(json_or_path))
        } else {
            Self::from_json_str(json_or_path)
        }
    }

    /// Atomically write the metadata as JSON to `path`.
    pub fn save(&self, path: &Path) -> Result<(), MetadataError> {
        let json = self.to_json_pretty()?;
        storage::write_atomic(path, json.as_bytes()).context(StorageSnafu)
    }
}

impl fmt::Display for TableMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} fields, {})",
            self.name,
            self.fields.len(),
            if self.is_healthy() { "ok" } else { "degraded" }
        )
    }
}

/// `fields` entries are objects, or JSON documents embedded as strings as
/// written by older catalog tools.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredField {
    Object(FieldMetadata),
    Encoded(String),
}

fn deserialize_fields<'de, D>(deserializer: D) -> Result<Vec<FieldMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Option::<Vec<StoredField>>::deserialize(deserializer)?.unwrap_or_default();
    stored
        .into_iter()
        .map(|entry| match entry {
            StoredField::Object(field) => Ok(field),
            StoredField::Encoded(json) => {
                serde_json::from_str(&json).map_err(serde::de::Error::custom)
            }
        })
        .collect()
}
