//! Coercing row payloads to a table's declared schema.
//!
//! Data read back from `data.parquet` (or handed over by a remote service)
//! is untrusted: columns may be missing, extra, or stored with a wider or
//! narrower type than the metadata declares. [`TableMetadata::try_conform`]
//! is the pure check-and-cast; [`TableMetadata::reconcile`] is the
//! best-effort wrapper used on load which never loses the caller's data.

use arrow::{
    array::{ArrayRef, RecordBatch, RecordBatchOptions},
    compute::{CastOptions, can_cast_types, cast_with_options},
    datatypes::DataType,
    error::ArrowError,
};
use log::warn;
use snafu::prelude::*;

use crate::metadata::{
    failure::{FailureKind, FailureRecord},
    table_metadata::TableMetadata,
};

/// Why a payload does not fit a declared schema.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ReconcileError {
    /// A declared column is absent from the payload.
    #[snafu(display("Declared column {column:?} is missing from the data"))]
    MissingColumn {
        /// Declared column name.
        column: String,
    },

    /// The payload has a column the metadata does not declare.
    #[snafu(display("Data column {column:?} is not declared in the table metadata"))]
    ExtraColumn {
        /// Payload column name.
        column: String,
    },

    /// Arrow has no cast between the two types.
    #[snafu(display("Column {column:?} cannot be converted from {from} to {to}"))]
    UnsupportedCast {
        /// Column name.
        column: String,
        /// Type found in the payload.
        from: DataType,
        /// Declared type.
        to: DataType,
    },

    /// A supported cast failed on the actual values.
    #[snafu(display("Failed to convert column {column:?} from {from} to {to}: {source}"))]
    CastColumn {
        /// Column name.
        column: String,
        /// Type found in the payload.
        from: DataType,
        /// Declared type.
        to: DataType,
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// The coerced columns could not be assembled into a batch.
    #[snafu(display("Failed to assemble reconciled batch: {source}"))]
    Assemble {
        /// Underlying Arrow error.
        source: ArrowError,
    },
}

impl TableMetadata {
    /// Check `payload` against the declared schema and return a copy whose
    /// columns are in declared order with declared types.
    ///
    /// Columns are matched by name. Casting is checked: a value that does
    /// not survive the conversion (overflow, unparsable text) is an error
    /// rather than a silent null.
    pub fn try_conform(&self, payload: &RecordBatch) -> Result<RecordBatch, ReconcileError> {
        let target = self.arrow_schema();
        let payload_schema = payload.schema();

        if let Some(extra) = payload_schema
            .fields()
            .iter()
            .find(|f| target.field_with_name(f.name()).is_err())
        {
            return ExtraColumnSnafu {
                column: extra.name().clone(),
            }
            .fail();
        }

        let options = CastOptions {
            safe: false,
            ..Default::default()
        };

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(target.fields().len());
        for field in target.fields() {
            let (idx, _) = payload_schema
                .column_with_name(field.name())
                .context(MissingColumnSnafu {
                    column: field.name().clone(),
                })?;
            let column = payload.column(idx);
            let from = column.data_type();
            let to = field.data_type();

            if from == to {
                columns.push(column.clone());
                continue;
            }

            ensure!(
                can_cast_types(from, to),
                UnsupportedCastSnafu {
                    column: field.name().clone(),
                    from: from.clone(),
                    to: to.clone(),
                }
            );

            let cast = cast_with_options(column, to, &options).context(CastColumnSnafu {
                column: field.name().clone(),
                from: from.clone(),
                to: to.clone(),
            })?;
            columns.push(cast);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(payload.num_rows()));
        RecordBatch::try_new_with_options(target, columns, &options).context(AssembleSnafu)
    }

    /// Best-effort coercion of `payload` to the declared schema.
    ///
    /// On success the conformed batch is returned. On failure the failure is
    /// appended to [`Self::failures`] and `payload` comes back untouched.
    pub fn reconcile(&mut self, payload: RecordBatch) -> RecordBatch {
        match self.try_conform(&payload) {
            Ok(conformed) => conformed,
            Err(e) => {
                warn!("table {:?}: data does not match metadata: {e}", self.name());
                self.record_failure(FailureRecord::new(FailureKind::Reconcile, &e));
                payload
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FieldMetadata, VoDatatype};
    use arrow::array::{Float64Array, Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn meta() -> TableMetadata {
        TableMetadata::new(
            "",
            "t",
            "",
            "",
            vec![
                FieldMetadata::new("id", VoDatatype::Int),
                FieldMetadata::new("flux", VoDatatype::Double),
            ],
        )
    }

    fn batch(fields: Vec<Field>, columns: Vec<ArrayRef>) -> Result<RecordBatch, ArrowError> {
        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
    }

    #[test]
    fn conformant_payload_is_unchanged() -> TestResult {
        let mut meta = meta();
        let payload = batch(
            vec![
                Field::new("id", DataType::Int32, true),
                Field::new("flux", DataType::Float64, true),
            ],
            vec![
                Arc::new(Int32Array::from(vec![1, 2])),
                Arc::new(Float64Array::from(vec![0.5, 1.5])),
            ],
        )?;

        let out = meta.reconcile(payload.clone());
        assert_eq!(out, payload);
        assert!(meta.is_healthy());
        Ok(())
    }

    #[test]
    fn casts_and_reorders_to_declared_schema() -> TestResult {
        let mut meta = meta();
        let payload = batch(
            vec![
                Field::new("flux", DataType::Float64, true),
                Field::new("id", DataType::Int64, false),
            ],
            vec![
                Arc::new(Float64Array::from(vec![0.5])),
                Arc::new(Int64Array::from(vec![7])),
            ],
        )?;

        let out = meta.reconcile(payload);
        assert!(meta.is_healthy());
        assert_eq!(out.schema(), meta.arrow_schema());
        let ids = out
            .column(0)
            .as_any()
            .downcast_ref::<Int32Array>()
            .ok_or("id should be Int32")?;
        assert_eq!(ids.value(0), 7);
        Ok(())
    }

    #[test]
    fn extra_column_is_captured_and_payload_kept() -> TestResult {
        let mut meta = meta();
        let payload = batch(
            vec![
                Field::new("id", DataType::Int32, true),
                Field::new("flux", DataType::Float64, true),
                Field::new("note", DataType::Utf8, true),
            ],
            vec![
                Arc::new(Int32Array::from(vec![1])),
                Arc::new(Float64Array::from(vec![1.0])),
                Arc::new(StringArray::from(vec!["x"])),
            ],
        )?;

        let out = meta.reconcile(payload.clone());
        assert_eq!(out, payload);
        assert!(!meta.is_healthy());
        assert_eq!(meta.failures()[0].kind, FailureKind::Reconcile);
        assert!(meta.failures()[0].message.contains("note"));
        Ok(())
    }

    #[test]
    fn failures_accumulate_instead_of_replacing() -> TestResult {
        let mut meta = meta();
        let missing_flux = batch(
            vec![Field::new("id", DataType::Int32, true)],
            vec![Arc::new(Int32Array::from(vec![1]))],
        )?;
        let bad_text = batch(
            vec![
                Field::new("id", DataType::Utf8, true),
                Field::new("flux", DataType::Float64, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["not a number"])),
                Arc::new(Float64Array::from(vec![1.0])),
            ],
        )?;

        meta.reconcile(missing_flux);
        meta.reconcile(bad_text);

        let failures = meta.failures();
        assert_eq!(failures.len(), 2);
        assert!(failures[0].message.contains("flux"), "{}", failures[0]);
        assert!(failures[1].message.contains("id"), "{}", failures[1]);
        Ok(())
    }

    #[test]
    fn unsupported_cast_is_reported() -> TestResult {
        let meta = TableMetadata::new(
            "",
            "t",
            "",
            "",
            vec![FieldMetadata::new("flag", VoDatatype::Boolean)],
        );
        let payload = batch(
            vec![Field::new(
                "flag",
                DataType::List(Arc::new(Field::new("item", DataType::Int32, true))),
                true,
            )],
            vec![arrow::array::new_empty_array(&DataType::List(Arc::new(
                Field::new("item", DataType::Int32, true),
            )))],
        )?;

        let err = meta.try_conform(&payload).unwrap_err();
        assert!(matches!(err, ReconcileError::UnsupportedCast { .. }), "{err:?}");
        Ok(())
    }
}
