//! Core engine for saved astronomical catalog tables.
//!
//! This crate provides the foundational pieces for `vo-catalog`:
//!
//! - A column and table metadata model mirroring VOTable `FIELD`
//!   attributes, persisted as `metadata.json` (`metadata` module).
//! - Best-effort schema reconciliation that coerces row data to the
//!   declared schema and records, rather than raises, any mismatch.
//! - Table persistence as one folder per table with `metadata.json` and
//!   `data.parquet` (`table`, `storage` and `formats` modules).
//! - A lazy catalog walker over nested table folders (`catalog` module).
//! - A predicate search engine with `name`, `title`, `description`,
//!   `field_<attr>` and `filter` keys (`search` module).
//! - The trait boundary for fetching tables from remote registries and
//!   services with bounded concurrency (`fetch` module).
//!
//! Front ends (the `vo-catalog` facade, the `vocat` CLI) depend on this
//! crate rather than re-implementing the storage and search logic.
#![deny(missing_docs)]
pub mod catalog;
pub mod fetch;
pub mod formats;
pub mod metadata;
pub mod search;
pub mod storage;
pub mod table;

pub use catalog::{CatalogWalker, load_table, load_tables_from, save_table, save_tables, walk};
pub use metadata::{FieldMetadata, TableMetadata};
pub use search::{Predicates, SearchError, search};
pub use table::{Table, TableError};
