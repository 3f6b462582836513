//! Metadata layer.
//!
//! The durable description of a catalog table: its identity, its declared
//! columns, and any failures captured while loading or reconciling it.

pub mod failure;
pub mod field;
pub mod reconcile;
pub mod table_metadata;
pub mod units;

pub use failure::{FailureKind, FailureRecord};
pub use field::{FieldAttr, FieldDescriptor, FieldMetadata, VoDatatype};
pub use reconcile::ReconcileError;
pub use table_metadata::{LOAD_FAILURE_SENTINEL, MetadataError, TableMetadata};
pub use units::{Unit, UnitFactor, UnitParseError};
