//! Wrapper prelude.
//!
//! The `vo-catalog` crate is the supported public entry point.
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::fetch;
pub use crate::{
    FieldMetadata, FilterOutcome, Predicates, RowPredicate, SearchError, Table, TableError,
    TableMetadata, TableTransform, load_table, save_tables, search, walk,
};
