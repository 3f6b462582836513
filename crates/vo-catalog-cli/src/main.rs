//! CLI tool for browsing and searching saved catalog tables.

mod error;
mod output;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, debug};
use snafu::{OptionExt, ResultExt};
use vo_catalog_core::{
    Predicates, Table, catalog, search::CompiledSearch, storage::layout,
};

use crate::{
    error::{
        CatalogMissingSnafu, CliResult, InvalidPredicateArgSnafu, NotATableSnafu, SearchSnafu,
    },
    output::{preview_message, render_fields, render_preview, render_table_list},
};

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the tables under a catalog directory that match every predicate
    Search {
        #[arg(long, env = "VOCAT_CATALOG")]
        catalog: PathBuf,

        /// Predicate as key=value, e.g. `field_ucd_like=phot.mag%`.
        /// Repeating a key adds values to it.
        #[arg(short = 'p', long = "predicate", value_name = "KEY=VALUE")]
        predicates: Vec<String>,

        /// Print one table name per line instead of a summary table
        #[arg(long, default_value_t = false)]
        names_only: bool,
    },

    /// Show the metadata, fields and leading rows of one saved table
    Show {
        #[arg(long)]
        table: PathBuf,

        #[arg(long, default_value_t = 10)]
        max_rows: usize,
    },

    /// List every table under a catalog directory
    List {
        #[arg(long, env = "VOCAT_CATALOG")]
        catalog: PathBuf,
    },
}

#[derive(Debug, Parser)]
#[command(name = "vocat", version)]
struct Cli {
    /// Log more (-v: debug, -vv: trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn parse_predicates(args: &[String]) -> CliResult<Predicates> {
    let mut predicates = Predicates::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .context(InvalidPredicateArgSnafu { arg })?;
        predicates.insert(key.trim(), value);
    }
    Ok(predicates)
}

fn check_catalog(catalog: &Path) -> CliResult<()> {
    std::fs::metadata(catalog).context(CatalogMissingSnafu {
        path: catalog.display().to_string(),
    })?;
    Ok(())
}

fn print_tables(tables: &[Table]) {
    if tables.is_empty() {
        println!("No tables found.");
        return;
    }
    println!("{}", render_table_list(tables));

    for table in tables.iter().filter(|t| !t.is_healthy()) {
        let location = table
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| table.name().to_string());
        for failure in table.metadata().failures() {
            eprintln!("{location}: {failure}");
        }
    }
}

fn cmd_search(catalog: &Path, predicate_args: &[String], names_only: bool) -> CliResult<()> {
    // Validate predicates before touching the catalog.
    let predicates = parse_predicates(predicate_args)?;
    let compiled = CompiledSearch::compile(&predicates).context(SearchSnafu)?;
    check_catalog(catalog)?;
    debug!("searching {} with {predicates}", catalog.display());

    let results = compiled.filter_tables(catalog::walk(catalog));
    if names_only {
        for table in results {
            println!("{}", table.name());
        }
        return Ok(());
    }

    let tables: Vec<Table> = results.collect();
    print_tables(&tables);
    Ok(())
}

fn cmd_list(catalog: &Path) -> CliResult<()> {
    check_catalog(catalog)?;
    let tables = catalog::load_tables_from(catalog);
    print_tables(&tables);
    Ok(())
}

fn cmd_show(folder: &Path, max_rows: usize) -> CliResult<()> {
    if !layout::is_table_dir(folder) {
        return NotATableSnafu { path: folder }.fail();
    }

    let table = catalog::load_table(folder);
    let meta = table.metadata();
    println!("{table}");
    if !meta.access_url().is_empty() {
        println!("access_url: {}", meta.access_url());
    }
    println!("rows: {}", table.num_rows());

    if !table.fields().is_empty() {
        println!("{}", render_fields(table.fields()));
    }

    for failure in meta.failures() {
        println!("failure: {failure}");
    }

    if let Some(preview) = render_preview(table.data(), max_rows)? {
        println!("{preview}");
    }
    if let Some(message) = preview_message(table.data(), max_rows) {
        println!("{message}");
    }
    Ok(())
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Command::Search {
            catalog,
            predicates,
            names_only,
        } => cmd_search(&catalog, &predicates, names_only),
        Command::Show { table, max_rows } => cmd_show(&table, max_rows),
        Command::List { catalog } => cmd_list(&catalog),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn predicate_args_accumulate_per_key() {
        let args = ["name=foo", "name=bar", "field_ucd_like=phot.%"].map(String::from);
        let predicates = parse_predicates(&args).unwrap();

        assert_eq!(predicates.len(), 2);
        let (key, values) = predicates.iter().next().unwrap();
        assert_eq!(key, "name");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let args = ["description_like=a=b%".to_string()];
        let predicates = parse_predicates(&args).unwrap();
        assert_eq!(predicates.to_string(), r#"description_like="a=b%""#);
    }

    #[test]
    fn malformed_predicate_args_are_rejected() {
        for bad in ["name", "=foo", "  =x"] {
            let err = parse_predicates(&[bad.to_string()]).unwrap_err();
            assert!(matches!(err, CliError::InvalidPredicateArg { .. }), "{bad}");
        }
    }

    #[test]
    fn cli_parses_repeated_predicates() {
        let cli = Cli::try_parse_from([
            "vocat", "-v", "search", "--catalog", "/tmp/cat", "-p", "name=a", "-p", "title=b",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.cmd {
            Command::Search { predicates, .. } => assert_eq!(predicates.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
