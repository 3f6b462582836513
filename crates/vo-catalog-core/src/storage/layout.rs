//! On-disk layout of a saved table folder.
//!
//! One folder per table:
//! - `metadata.json`: the serialized [`crate::metadata::TableMetadata`]
//! - `data.parquet`: the row data
//!
//! The functions here only build paths; callers do the I/O.

use std::path::{Path, PathBuf};

/// File name of the table metadata document.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// File name of the columnar row data.
pub const DATA_FILE_NAME: &str = "data.parquet";

/// `<folder>/metadata.json`
pub fn metadata_path(folder: &Path) -> PathBuf {
    folder.join(METADATA_FILE_NAME)
}

/// `<folder>/data.parquet`
pub fn data_path(folder: &Path) -> PathBuf {
    folder.join(DATA_FILE_NAME)
}

/// A folder is a saved-table folder if it directly holds either file.
pub fn is_table_dir(folder: &Path) -> bool {
    metadata_path(folder).is_file() || data_path(folder).is_file()
}
