use std::{path::Path, sync::Arc};

use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray};
use vo_catalog_core::{
    Table, save_tables,
    metadata::{FieldMetadata, TableMetadata, VoDatatype},
};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn star_table(name: &str, title: &str, flux_ucd: &str, flux: &[f64]) -> TestResult<Table> {
    let meta = TableMetadata::new(
        format!("https://vo.example.org/{name}/scs?"),
        name,
        title,
        format!("{title} source list"),
        vec![
            FieldMetadata::new("id", VoDatatype::Char).with_ucd("meta.id"),
            FieldMetadata::new("flux", VoDatatype::Double).with_ucd(flux_ucd),
        ],
    );
    let ids: Vec<String> = (0..flux.len()).map(|i| format!("{name}-{i}")).collect();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(Float64Array::from(flux.to_vec())),
    ];
    let data = RecordBatch::try_new(meta.arrow_schema(), columns)?;
    Ok(Table::new(meta, data))
}

/// `foo` and `II/246/out` carry photometry; `bar` only positions.
pub fn write_catalog(root: &Path) -> TestResult {
    save_tables(
        &[
            star_table("foo", "Foo Survey", "phot.flux", &[1.0, 5.0, 9.0])?,
            star_table("bar", "Bar Positions", "pos.eq.ra", &[0.5])?,
            star_table("II/246/out", "2MASS All-Sky", "phot.mag;em.ir.j", &[12.1])?,
        ],
        root,
    )?;
    Ok(())
}
