//! Table layer.
//!
//! A [`Table`] pairs a [`TableMetadata`] with its row data. Each table lives
//! in its own folder (see [`crate::storage::layout`]) and is loaded
//! best-effort: [`Table::load`] always returns a table, degraded if need be,
//! so a walk over a large catalog is never aborted by one bad folder.

mod error;

pub use error::TableError;
pub(crate) use error::InvalidTableNameSnafu;

use std::{
    fmt,
    path::{Path, PathBuf},
};

use arrow::{array::RecordBatch, compute::filter_record_batch, datatypes::Schema};
use log::{debug, warn};
use snafu::prelude::*;

use crate::{
    fetch::{ResourceInfo, ServiceResult},
    formats::parquet,
    metadata::{FailureKind, FailureRecord, FieldMetadata, TableMetadata},
    search::RowPredicate,
    storage::{self, layout},
};
use error::{ArrowSnafu, DataSnafu, MetadataSnafu, StorageSnafu};

/// A catalog table: metadata plus row data.
#[derive(Debug, Clone)]
pub struct Table {
    metadata: TableMetadata,
    data: RecordBatch,
    path: Option<PathBuf>,
}

impl Table {
    /// Pair `metadata` with `data` as-is.
    pub fn new(metadata: TableMetadata, data: RecordBatch) -> Self {
        Table {
            metadata,
            data,
            path: None,
        }
    }

    /// Build a table from a fetched service result.
    ///
    /// The rows are reconciled against the declared fields; a mismatch is
    /// captured on the metadata and the raw rows are kept.
    pub fn from_service_result(resource: &ResourceInfo, result: ServiceResult) -> Self {
        let mut metadata = TableMetadata::from_service_result(resource, &result.fields);
        let data = metadata.reconcile(result.rows);
        Table::new(metadata, data)
    }

    /// The table's metadata.
    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    /// The table's rows.
    pub fn data(&self) -> &RecordBatch {
        &self.data
    }

    /// Folder the table was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Short name.
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// Title.
    pub fn title(&self) -> &str {
        self.metadata.title()
    }

    /// Description.
    pub fn description(&self) -> &str {
        self.metadata.description()
    }

    /// Declared columns.
    pub fn fields(&self) -> &[FieldMetadata] {
        self.metadata.fields()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.data.num_rows()
    }

    /// See [`TableMetadata::is_healthy`].
    pub fn is_healthy(&self) -> bool {
        self.metadata.is_healthy()
    }

    /// Split into metadata and data.
    pub fn into_parts(self) -> (TableMetadata, RecordBatch) {
        (self.metadata, self.data)
    }

    /// Write `metadata.json` and `data.parquet` into `folder`, creating it
    /// if needed.
    pub fn save(&self, folder: &Path) -> Result<(), TableError> {
        storage::create_dir_all(folder).context(StorageSnafu)?;
        self.metadata
            .save(&layout::metadata_path(folder))
            .context(MetadataSnafu)?;
        parquet::write_parquet_file(&layout::data_path(folder), &self.data).context(DataSnafu)?;
        debug!("saved table {:?} to {}", self.name(), folder.display());
        Ok(())
    }

    /// Load the table saved in `folder`.
    ///
    /// - Missing or undecodable `metadata.json`: the metadata is replaced by
    ///   [`TableMetadata::load_failure`] and the rows are kept as stored.
    /// - Decoded metadata: data starts as the empty schema frame, and a
    ///   readable `data.parquet` is reconciled against it. Failures captured
    ///   by earlier loads do not change this; new ones are appended.
    /// - Missing `data.parquet` is not a failure.
    /// - Unreadable `data.parquet` is captured as a
    ///   [`FailureKind::DataLoad`] failure.
    pub fn load(folder: &Path) -> Table {
        let (mut metadata, decoded) =
            match TableMetadata::from_json_file(&layout::metadata_path(folder)) {
                Ok(meta) => (meta, true),
                Err(e) => {
                    warn!("table folder {}: {e}", folder.display());
                    (TableMetadata::load_failure(e), false)
                }
            };

        let frame = if decoded {
            metadata.schema_frame()
        } else {
            RecordBatch::new_empty(Schema::empty().into())
        };

        let data = match parquet::read_parquet_file(&layout::data_path(folder)) {
            Ok(raw) if decoded => metadata.reconcile(raw),
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                debug!("table folder {}: no data file", folder.display());
                frame
            }
            Err(e) => {
                warn!("table folder {}: {e}", folder.display());
                metadata.record_failure(FailureRecord::new(FailureKind::DataLoad, &e));
                frame
            }
        };

        Table {
            metadata,
            data,
            path: Some(folder.to_path_buf()),
        }
    }

    /// A copy of this table keeping only the rows `predicate` selects.
    /// Null predicate results drop the row.
    pub fn filter_rows(&self, predicate: &RowPredicate) -> Result<Table, TableError> {
        let mask = predicate.evaluate(&self.data).context(ArrowSnafu)?;
        let data = filter_record_batch(&self.data, &mask).context(ArrowSnafu)?;
        Ok(Table {
            metadata: self.metadata.clone(),
            data,
            path: self.path.clone(),
        })
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Table(name={}, title={}, description={})",
            self.name(),
            self.title(),
            self.description()
        )
    }
}
