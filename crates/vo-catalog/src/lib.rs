//! # vo-catalog
//!
//! Save, reload and search collections of astronomical catalog tables.
//!
//! This crate is the supported public entry point and provides a small, stable surface.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vo_catalog::prelude::*;
//!
//! # fn main() -> Result<(), SearchError> {
//! let predicates = Predicates::new()
//!     .with("field_ucd_regex", "phot\\.mag")
//!     .with("title_like", "%2mass%");
//!
//! for table in search(&predicates, "/data/catalog")? {
//!     println!("{table}");
//! }
//! # Ok(())
//! # }
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// Remote-fetch boundary (traits for registries and services).
pub mod fetch {
    pub use vo_catalog_core::fetch::{
        ConeSearchResource, FetchError, FetchOptions, FieldDescriptor, Registry, RegistryQuery,
        ResourceInfo, ServiceResult, ServiceType, SkyPosition, TapService, Waveband, cone_search,
        tap_query,
    };
}

pub use vo_catalog_core::catalog::{
    CatalogWalker, load_table, load_tables_from, save_table, save_tables, walk,
};
pub use vo_catalog_core::metadata::{
    FailureKind, FailureRecord, FieldAttr, FieldMetadata, LOAD_FAILURE_SENTINEL, MetadataError,
    TableMetadata, Unit, VoDatatype,
};
pub use vo_catalog_core::search::{
    CompiledSearch, FilterOutcome, PredicateValue, Predicates, RowPredicate, SearchError,
    SearchResults, TableTransform, search, search_in,
};
pub use vo_catalog_core::table::{Table, TableError};
