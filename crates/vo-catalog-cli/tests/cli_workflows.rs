#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::io;
use std::process::{Command, Output};

use tempfile::TempDir;

use common::{TestResult, write_catalog};

fn cli_bin() -> &'static str {
    env!("CARGO_BIN_EXE_vocat")
}

fn run_cli(args: &[&str]) -> io::Result<Output> {
    Command::new(cli_bin())
        .env_remove("VOCAT_CATALOG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_cli_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn catalog() -> TestResult<TempDir> {
    let tmp = TempDir::new()?;
    write_catalog(tmp.path())?;
    Ok(tmp)
}

#[test]
fn list_shows_every_table() -> TestResult {
    let tmp = catalog()?;
    let root = tmp.path().to_str().unwrap();

    let output = run_cli(&["list", "--catalog", root])?;
    assert_cli_success(&output);

    let out = stdout(&output);
    for name in ["foo", "bar", "II/246/out", "2MASS All-Sky"] {
        assert!(out.contains(name), "missing {name}:\n{out}");
    }
    assert!(out.contains("health"));
    assert!(out.contains("ok"));
    Ok(())
}

#[test]
fn search_names_only_prints_matches_in_walk_order() -> TestResult {
    let tmp = catalog()?;
    let root = tmp.path().to_str().unwrap();

    let output = run_cli(&[
        "search",
        "--catalog",
        root,
        "-p",
        "field_ucd_regex=phot",
        "--names-only",
    ])?;
    assert_cli_success(&output);
    assert_eq!(stdout(&output), "II/246/out\nfoo\n");
    Ok(())
}

#[test]
fn repeated_keys_accumulate_values() -> TestResult {
    let tmp = catalog()?;
    let root = tmp.path().to_str().unwrap();

    let output = run_cli(&[
        "search", "--catalog", root, "-p", "name=foo", "-p", "name=bar", "--names-only",
    ])?;
    assert_cli_success(&output);
    assert_eq!(stdout(&output), "bar\nfoo\n");
    Ok(())
}

#[test]
fn catalog_can_come_from_the_environment() -> TestResult {
    let tmp = catalog()?;

    let output = Command::new(cli_bin())
        .env("VOCAT_CATALOG", tmp.path())
        .args(["search", "-p", "title_like=%survey", "--names-only"])
        .output()?;
    assert_cli_success(&output);
    assert_eq!(stdout(&output), "foo\n");
    Ok(())
}

#[test]
fn no_match_is_not_an_error() -> TestResult {
    let tmp = catalog()?;
    let root = tmp.path().to_str().unwrap();

    let output = run_cli(&["search", "--catalog", root, "-p", "name=nothing"])?;
    assert_cli_success(&output);
    assert!(stdout(&output).contains("No tables found."));
    Ok(())
}

#[test]
fn unknown_key_fails_with_message() -> TestResult {
    let tmp = catalog()?;
    let root = tmp.path().to_str().unwrap();

    let output = run_cli(&["search", "--catalog", root, "-p", "colour=red"])?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("colour"), "{}", stderr(&output));

    let output = run_cli(&["search", "--catalog", root, "-p", "name"])?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("expected key=value"));
    Ok(())
}

#[test]
fn filter_key_is_rejected_from_the_command_line() -> TestResult {
    let tmp = catalog()?;
    let root = tmp.path().to_str().unwrap();

    let output = run_cli(&["search", "--catalog", root, "-p", "filter=flux>1"])?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("filter"), "{}", stderr(&output));
    Ok(())
}

#[test]
fn missing_catalog_fails() -> TestResult {
    let tmp = TempDir::new()?;
    let missing = tmp.path().join("absent");

    let output = run_cli(&["list", "--catalog", missing.to_str().unwrap()])?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not found"));
    Ok(())
}

#[test]
fn show_prints_fields_and_preview() -> TestResult {
    let tmp = catalog()?;
    let folder = tmp.path().join("foo");

    let output = run_cli(&["show", "--table", folder.to_str().unwrap(), "--max-rows", "2"])?;
    assert_cli_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Table(name=foo, title=Foo Survey"));
    assert!(out.contains("Fields"));
    assert!(out.contains("phot.flux"));
    assert!(out.contains("Preview output"));
    assert!(out.contains("foo-1"));
    assert!(!out.contains("foo-2"));
    assert!(out.contains("(2 of 3 rows shown)"));
    Ok(())
}

#[test]
fn show_reports_captured_failures() -> TestResult {
    let tmp = catalog()?;
    let folder = tmp.path().join("bar");
    std::fs::write(folder.join("data.parquet"), b"not parquet")?;

    let output = run_cli(&["show", "--table", folder.to_str().unwrap()])?;
    assert_cli_success(&output);

    let out = stdout(&output);
    assert!(out.contains("failure: data load failure"), "{out}");
    assert!(out.contains("(no rows)"));
    Ok(())
}

#[test]
fn show_rejects_a_plain_directory() -> TestResult {
    let tmp = TempDir::new()?;

    let output = run_cli(&["show", "--table", tmp.path().to_str().unwrap()])?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No saved table"));
    Ok(())
}
