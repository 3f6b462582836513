use std::path::PathBuf;

use arrow::error::ArrowError;
use snafu::Snafu;
use vo_catalog_core::search::SearchError;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Invalid predicate '{arg}': expected key=value"))]
    InvalidPredicateArg { arg: String },

    #[snafu(display("Invalid search: {source}"))]
    Search { source: SearchError },

    #[snafu(display("Catalog directory not found or not accessible: {path}"))]
    CatalogMissing {
        path: String,
        source: std::io::Error,
    },

    #[snafu(display(
        "No saved table at {}. \
         Expected metadata.json or data.parquet in that folder.",
        path.display()
    ))]
    NotATable { path: PathBuf },

    #[snafu(display("Failed to format table data: {source}"))]
    Format { source: ArrowError },
}
