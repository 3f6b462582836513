//! Integration tests for predicate search over an on-disk catalog.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch};
use tempfile::TempDir;
use vo_catalog_core::metadata::{FieldMetadata, TableMetadata, Unit, VoDatatype};
use vo_catalog_core::search::{
    Predicates, RowPredicate, SearchError, TableTransform, search,
};
use vo_catalog_core::{Table, save_tables};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn flux_table(name: &str, title: &str, flux: &[f64]) -> Table {
    let meta = TableMetadata::new(
        format!("https://example.org/{name}/scs?"),
        name,
        title,
        format!("Fluxes from the {title} survey"),
        vec![
            FieldMetadata::new("flux", VoDatatype::Double)
                .with_ucd("phot.flux")
                .with_unit(Unit::parse_lenient("mJy")),
        ],
    );
    let column: ArrayRef = Arc::new(Float64Array::from(flux.to_vec()));
    let data = RecordBatch::try_new(meta.arrow_schema(), vec![column]).unwrap();
    Table::new(meta, data)
}

/// Tables A (`foo`) and B (`bar`), each with a `flux` field of UCD `phot.flux`.
fn catalog() -> Result<TempDir, Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    save_tables(
        &[
            flux_table("foo", "Foo Sky", &[1.0, 4.0]),
            flux_table("bar", "Bar Sky", &[0.2]),
        ],
        tmp.path(),
    )?;
    Ok(tmp)
}

fn found(predicates: &Predicates, root: &Path) -> Result<Vec<String>, SearchError> {
    let mut names: Vec<_> = search(predicates, root)?
        .map(|t| t.name().to_string())
        .collect();
    names.sort();
    Ok(names)
}

#[test]
fn exact_name_selects_one_table() -> TestResult {
    let dir = catalog()?;
    assert_eq!(found(&Predicates::new().with("name", "foo"), dir.path())?, ["foo"]);
    assert_eq!(found(&Predicates::new().with("NAME", "FOO"), dir.path())?, ["foo"]);
    Ok(())
}

#[test]
fn negated_name_selects_the_other() -> TestResult {
    let dir = catalog()?;
    assert_eq!(found(&Predicates::new().with("name_not", "foo"), dir.path())?, ["bar"]);
    Ok(())
}

#[test]
fn field_ucd_matches_both() -> TestResult {
    let dir = catalog()?;
    let p = Predicates::new().with("field_ucd", "phot.flux");
    assert_eq!(found(&p, dir.path())?, ["bar", "foo"]);
    Ok(())
}

#[test]
fn regex_and_like_prefixes() -> TestResult {
    let dir = catalog()?;
    assert_eq!(found(&Predicates::new().with("name_regex", "^f"), dir.path())?, ["foo"]);
    assert_eq!(found(&Predicates::new().with("name_like", "f%"), dir.path())?, ["foo"]);
    assert_eq!(found(&Predicates::new().with("field_unit_like", "mj_"), dir.path())?, ["bar", "foo"]);
    Ok(())
}

#[test]
fn patterns_match_regardless_of_case() -> TestResult {
    let dir = catalog()?;
    assert_eq!(found(&Predicates::new().with("name", "Foo"), dir.path())?, ["foo"]);
    assert_eq!(found(&Predicates::new().with("name_like", "F%"), dir.path())?, ["foo"]);
    assert_eq!(found(&Predicates::new().with("name_regex", "F"), dir.path())?, ["foo"]);
    assert_eq!(found(&Predicates::new().with("field_unit_like", "MJY"), dir.path())?, ["bar", "foo"]);
    Ok(())
}

#[test]
fn no_match_is_empty() -> TestResult {
    let dir = catalog()?;
    assert!(found(&Predicates::new().with("name", "nope"), dir.path())?.is_empty());
    Ok(())
}

#[test]
fn value_lists_default_to_any_and_all_narrows() -> TestResult {
    let dir = catalog()?;
    let any = Predicates::new().with("name", ["foo", "bar"]);
    assert_eq!(found(&any, dir.path())?, ["bar", "foo"]);

    let all = Predicates::new().with("name_all", ["foo", "bar"]);
    assert!(found(&all, dir.path())?.is_empty());
    Ok(())
}

#[test]
fn every_field_excluded_by_not() -> TestResult {
    let dir = catalog()?;
    let p = Predicates::new().with("field_ucd_not", "phot.flux");
    assert!(found(&p, dir.path())?.is_empty());
    Ok(())
}

#[test]
fn filters_see_reconciled_data() -> TestResult {
    let dir = catalog()?;
    let p = Predicates::new().with("filter", RowPredicate::column_gt("flux", 1.0));
    assert_eq!(found(&p, dir.path())?, ["foo"]);

    let p = Predicates::new().with(
        "filter",
        TableTransform::select_rows(RowPredicate::column_gt("flux", 0.1)),
    );
    let rows: Vec<_> = search(&p, dir.path())?
        .map(|t| (t.name().to_string(), t.num_rows()))
        .collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.contains(&("foo".to_string(), 2)));
    assert!(rows.contains(&("bar".to_string(), 1)));
    Ok(())
}

#[test]
fn bad_keys_fail_before_reading_the_catalog() {
    let missing = Path::new("/definitely/not/a/catalog");

    let err = search(&Predicates::new().with("colour", "red"), missing).unwrap_err();
    assert!(matches!(err, SearchError::UnknownKey { .. }));

    let err = search(&Predicates::new().with("field_bogus", "x"), missing).unwrap_err();
    assert!(matches!(err, SearchError::UnknownFieldAttr { .. }));

    let err = search(&Predicates::new().with("title_regex", "(unclosed"), missing).unwrap_err();
    assert!(matches!(err, SearchError::InvalidPattern { .. }));
}

#[test]
fn results_are_lazy() -> TestResult {
    let dir = catalog()?;
    let mut results = search(&Predicates::new(), dir.path())?;
    let first = results.next().expect("one table");

    // Removing the rest of the catalog after the first result only affects
    // tables not yet loaded.
    let other = if first.name() == "foo" { "bar" } else { "foo" };
    std::fs::remove_dir_all(dir.path().join(other))?;
    assert!(results.next().is_none());
    Ok(())
}
