//! Values accepted by the `filter` key.
//!
//! A [`RowPredicate`] is evaluated against a table's rows and matches when
//! at least one row is selected. A [`TableTransform`] sees the whole table
//! and may keep it, reject it, or hand back a different table to yield in
//! its place.

use std::{fmt, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, BooleanArray, Datum, Float64Array, RecordBatch, Scalar},
    compute::{cast, kernels::cmp},
    datatypes::DataType,
    error::ArrowError,
};
use log::warn;

use crate::table::Table;

type RowFn = dyn Fn(&RecordBatch) -> Result<BooleanArray, ArrowError> + Send + Sync;
type TransformFn = dyn Fn(&Table) -> FilterOutcome + Send + Sync;
type CmpKernel = fn(&dyn Datum, &dyn Datum) -> Result<BooleanArray, ArrowError>;

/// A boolean expression over a table's rows.
#[derive(Clone)]
pub struct RowPredicate {
    label: String,
    f: Arc<RowFn>,
}

impl RowPredicate {
    /// Wrap a closure producing one boolean per row.
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&RecordBatch) -> Result<BooleanArray, ArrowError> + Send + Sync + 'static,
    {
        RowPredicate {
            label: label.into(),
            f: Arc::new(f),
        }
    }

    /// Rows where numeric `column` is greater than `value`.
    pub fn column_gt(column: impl Into<String>, value: f64) -> Self {
        Self::compare(column.into(), ">", value, cmp::gt)
    }

    /// Rows where numeric `column` is less than `value`.
    pub fn column_lt(column: impl Into<String>, value: f64) -> Self {
        Self::compare(column.into(), "<", value, cmp::lt)
    }

    /// Rows where numeric `column` equals `value`.
    pub fn column_eq(column: impl Into<String>, value: f64) -> Self {
        Self::compare(column.into(), "==", value, cmp::eq)
    }

    fn compare(column: String, op: &str, value: f64, kernel: CmpKernel) -> Self {
        let label = format!("{column} {op} {value}");
        RowPredicate::new(label, move |batch| {
            let values = numeric_column(batch, &column)?;
            let rhs = Scalar::new(Float64Array::from(vec![value]));
            kernel(&values, &rhs)
        })
    }

    /// Evaluate against `batch`. Null entries select nothing.
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray, ArrowError> {
        let mask = (self.f)(batch)?;
        if mask.len() != batch.num_rows() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "row predicate {:?} produced {} values for {} rows",
                self.label,
                mask.len(),
                batch.num_rows()
            )));
        }
        Ok(mask)
    }

    /// True when at least one row of `batch` is selected.
    ///
    /// An evaluation error is logged and counts as no match.
    pub fn matches_any(&self, batch: &RecordBatch) -> bool {
        match self.evaluate(batch) {
            Ok(mask) => mask.true_count() > 0,
            Err(e) => {
                warn!("row predicate {:?} failed: {e}", self.label);
                false
            }
        }
    }

    /// Human-readable description.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for RowPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RowPredicate").field(&self.label).finish()
    }
}

fn numeric_column(batch: &RecordBatch, column: &str) -> Result<ArrayRef, ArrowError> {
    let array = batch.column_by_name(column).ok_or_else(|| {
        ArrowError::InvalidArgumentError(format!("no column named {column:?}"))
    })?;
    if array.data_type() == &DataType::Float64 {
        Ok(array.clone())
    } else {
        cast(array, &DataType::Float64)
    }
}

/// Result of a [`TableTransform`].
#[derive(Debug, Clone)]
pub enum FilterOutcome {
    /// Yield the table unchanged.
    Keep,
    /// The table does not match.
    Reject,
    /// Yield this table in place of the original.
    Replace(Table),
}

impl From<bool> for FilterOutcome {
    fn from(keep: bool) -> Self {
        if keep {
            FilterOutcome::Keep
        } else {
            FilterOutcome::Reject
        }
    }
}

impl From<Table> for FilterOutcome {
    fn from(table: Table) -> Self {
        FilterOutcome::Replace(table)
    }
}

/// A caller-supplied function deciding over a whole table.
#[derive(Clone)]
pub struct TableTransform {
    label: String,
    f: Arc<TransformFn>,
}

impl TableTransform {
    /// Wrap a closure.
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Table) -> FilterOutcome + Send + Sync + 'static,
    {
        TableTransform {
            label: label.into(),
            f: Arc::new(f),
        }
    }

    /// Replace each table by its rows matching `predicate`; tables with no
    /// matching rows are rejected.
    pub fn select_rows(predicate: RowPredicate) -> Self {
        let label = format!("select rows where {}", predicate.label());
        TableTransform::new(label, move |table| match table.filter_rows(&predicate) {
            Ok(projected) if projected.num_rows() > 0 => FilterOutcome::Replace(projected),
            Ok(_) => FilterOutcome::Reject,
            Err(e) => {
                warn!("table {:?}: {e}", table.name());
                FilterOutcome::Reject
            }
        })
    }

    /// Run the transform.
    pub fn apply(&self, table: &Table) -> FilterOutcome {
        (self.f)(table)
    }

    /// Human-readable description.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for TableTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TableTransform").field(&self.label).finish()
    }
}
