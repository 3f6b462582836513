//! Parquet encode/decode for a table's row data.
//!
//! A saved table keeps its rows in a single `data.parquet`. On read, all row
//! groups are concatenated into one [`RecordBatch`] because the rest of the
//! crate treats a table's data as a single structured container. On write,
//! the batch is encoded in memory and handed to
//! [`storage::write_atomic`](crate::storage::write_atomic).

use std::path::Path;

use arrow::{array::RecordBatch, compute::concat_batches, error::ArrowError};
use bytes::Bytes;
use parquet::{
    arrow::{ArrowWriter, arrow_reader::ParquetRecordBatchReaderBuilder},
    errors::ParquetError,
    file::properties::WriterProperties,
};
use snafu::prelude::*;

use crate::storage::{self, StorageError};

/// Errors raised while reading or writing Parquet row data.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParquetIoError {
    /// The underlying file could not be read or written.
    #[snafu(display("Storage error while accessing parquet data: {source}"))]
    Storage {
        /// Underlying storage error.
        source: StorageError,
    },

    /// The bytes are not a readable Parquet file.
    #[snafu(display("Parquet read error: {source}"))]
    ParquetRead {
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// Encoding the batch as Parquet failed.
    #[snafu(display("Parquet write error: {source}"))]
    ParquetWrite {
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// Decoding or concatenating Arrow batches failed.
    #[snafu(display("Arrow error while decoding parquet data: {source}"))]
    Arrow {
        /// Underlying Arrow error.
        source: ArrowError,
    },
}

impl ParquetIoError {
    /// True when the file does not exist (as opposed to being unreadable).
    pub fn is_not_found(&self) -> bool {
        matches!(self, ParquetIoError::Storage { source } if source.is_not_found())
    }
}

/// Decode an in-memory Parquet file into a single batch.
///
/// A file with zero rows yields an empty batch that still carries the file's
/// schema.
pub fn read_parquet_bytes(bytes: Bytes) -> Result<RecordBatch, ParquetIoError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).context(ParquetReadSnafu)?;
    let schema = builder.schema().clone();
    let reader = builder.build().context(ParquetReadSnafu)?;

    let batches = reader
        .collect::<Result<Vec<_>, ArrowError>>()
        .context(ArrowSnafu)?;

    concat_batches(&schema, &batches).context(ArrowSnafu)
}

/// Read the Parquet file at `path` into a single batch.
pub fn read_parquet_file(path: &Path) -> Result<RecordBatch, ParquetIoError> {
    let bytes = storage::read_all_bytes(path).context(StorageSnafu)?;
    read_parquet_bytes(Bytes::from(bytes))
}

/// Encode `batch` as an in-memory Parquet file.
pub fn write_parquet_bytes(batch: &RecordBatch) -> Result<Vec<u8>, ParquetIoError> {
    let mut buf = Vec::new();
    let props = WriterProperties::builder().build();
    let mut writer =
        ArrowWriter::try_new(&mut buf, batch.schema(), Some(props)).context(ParquetWriteSnafu)?;
    writer.write(batch).context(ParquetWriteSnafu)?;
    writer.close().context(ParquetWriteSnafu)?;
    Ok(buf)
}

/// Atomically write `batch` to `path` as Parquet.
pub fn write_parquet_file(path: &Path, batch: &RecordBatch) -> Result<(), ParquetIoError> {
    let buf = write_parquet_bytes(batch)?;
    storage::write_atomic(path, &buf).context(StorageSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int16Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn sample_batch() -> Result<RecordBatch, ArrowError> {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Utf8, true),
            Field::new("flux", DataType::Float64, true),
            Field::new("flags", DataType::Int16, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
                Arc::new(Float64Array::from(vec![1.5, 2.5, 3.5])),
                Arc::new(Int16Array::from(vec![1, 0, 7])),
            ],
        )
    }

    #[test]
    fn file_preserves_narrow_types_and_nulls() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("t/data.parquet");
        let batch = sample_batch()?;

        write_parquet_file(&path, &batch)?;
        let back = read_parquet_file(&path)?;

        assert_eq!(back.num_rows(), 3);
        assert_eq!(back.schema().field(2).data_type(), &DataType::Int16);
        assert_eq!(back.column(0).null_count(), 1);
        assert_eq!(back.columns(), batch.columns());
        Ok(())
    }

    #[test]
    fn empty_batch_keeps_schema() -> TestResult {
        let batch = RecordBatch::new_empty(sample_batch()?.schema());
        let bytes = write_parquet_bytes(&batch)?;
        let back = read_parquet_bytes(Bytes::from(bytes))?;

        assert_eq!(back.num_rows(), 0);
        assert_eq!(back.num_columns(), 3);
        Ok(())
    }

    #[test]
    fn garbage_is_a_read_error_not_not_found() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("data.parquet");
        std::fs::write(&path, b"definitely not parquet")?;

        let err = read_parquet_file(&path).unwrap_err();
        assert!(matches!(err, ParquetIoError::ParquetRead { .. }), "got {err:?}");
        assert!(!err.is_not_found());
        Ok(())
    }

    #[test]
    fn missing_file_is_not_found() -> TestResult {
        let tmp = TempDir::new()?;
        let err = read_parquet_file(&tmp.path().join("data.parquet")).unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }
}
