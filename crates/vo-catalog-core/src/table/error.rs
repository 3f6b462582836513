//! Error types and SNAFU context selectors for [`crate::table`].
//!
//! Loading a table folder never fails (problems are captured on the table's
//! metadata instead), so these errors only surface from saving, projecting,
//! or naming tables.

use arrow::error::ArrowError;
use snafu::prelude::*;

use crate::{formats::parquet::ParquetIoError, metadata::MetadataError, storage::StorageError};

/// Errors from table persistence and projection.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TableError {
    /// Writing `metadata.json` failed.
    #[snafu(display("Failed to write table metadata: {source}"))]
    Metadata {
        /// Underlying metadata error.
        source: MetadataError,
    },

    /// Writing `data.parquet` failed.
    #[snafu(display("Failed to write table data: {source}"))]
    Data {
        /// Underlying Parquet I/O error.
        source: ParquetIoError,
    },

    /// Creating the table folder failed.
    #[snafu(display("Storage error while preparing table folder: {source}"))]
    Storage {
        /// Underlying storage error.
        source: StorageError,
    },

    /// Arrow compute error while evaluating or applying a row filter.
    #[snafu(display("Arrow error while filtering rows: {source}"))]
    Arrow {
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// A table name cannot be used as a relative folder path.
    #[snafu(display("Table name {name:?} cannot be used as a folder name: {reason}"))]
    InvalidTableName {
        /// Offending table name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}
