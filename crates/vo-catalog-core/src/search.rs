//! Predicate search over saved tables.
//!
//! [`search`] walks a catalog directory and lazily yields the tables that
//! satisfy every key of a [`Predicates`] map. Keys are parsed and patterns
//! compiled up front by [`CompiledSearch::compile`], so a malformed key is
//! reported before any folder is read.
//!
//! Matching rules, per key:
//! - the key's values combine with *any* (default) or *all* (`_all`);
//! - text keys compare against the table's name, title, description, or one
//!   attribute of every field (`field_<attr>`), case-insensitively;
//! - `filter` values are row predicates (at least one row selected) or
//!   table transforms, and a transform may substitute the yielded table.
//!
//! Text keys are evaluated before `filter` keys; when a transform
//! substitutes a table, later filters see the substitute.

mod error;
mod filter;
mod matcher;
mod predicate;

pub use error::SearchError;
pub use filter::{FilterOutcome, RowPredicate, TableTransform};
pub use matcher::like_to_regex;
pub use predicate::{
    BaseKey, MatchStrategy, PredicateKey, PredicateValue, PredicateValues, Predicates, Quantifier,
};

use std::path::Path;

use log::debug;
use snafu::prelude::*;

use crate::{
    catalog::{self, CatalogWalker},
    table::Table,
};
use error::{InvalidValueKindSnafu, NoValuesSnafu};
use matcher::TextMatcher;

#[derive(Debug, Clone)]
enum CompiledPredicate {
    Text {
        key: String,
        base: BaseKey,
        quantifier: Quantifier,
        matchers: Vec<TextMatcher>,
    },
    Filter {
        key: String,
        values: Vec<FilterValue>,
    },
}

#[derive(Debug, Clone)]
enum FilterValue {
    Rows(RowPredicate),
    Transform(TableTransform),
}

/// A validated predicate map, ready to evaluate against tables.
#[derive(Debug, Clone)]
pub struct CompiledSearch {
    text: Vec<CompiledPredicate>,
    filters: Vec<CompiledPredicate>,
}

impl CompiledSearch {
    /// Parse every key and compile every value.
    pub fn compile(predicates: &Predicates) -> Result<Self, SearchError> {
        let mut text = Vec::new();
        let mut filters = Vec::new();

        for (key, values) in predicates.iter() {
            let parsed = PredicateKey::parse(key)?;
            ensure!(!values.is_empty(), NoValuesSnafu { key });

            if parsed.base == BaseKey::Filter {
                let values = values
                    .iter()
                    .map(|v| match v {
                        PredicateValue::Rows(p) => Ok(FilterValue::Rows(p.clone())),
                        PredicateValue::Transform(t) => Ok(FilterValue::Transform(t.clone())),
                        PredicateValue::Text(_) => InvalidValueKindSnafu {
                            key,
                            expected: "row predicate or table transform",
                            found: v.kind(),
                        }
                        .fail(),
                    })
                    .collect::<Result<_, _>>()?;
                filters.push(CompiledPredicate::Filter {
                    key: key.to_string(),
                    values,
                });
            } else {
                let matchers = values
                    .iter()
                    .map(|v| match v {
                        PredicateValue::Text(s) => TextMatcher::compile(key, parsed.strategy, s),
                        _ => InvalidValueKindSnafu {
                            key,
                            expected: "text",
                            found: v.kind(),
                        }
                        .fail(),
                    })
                    .collect::<Result<_, _>>()?;
                text.push(CompiledPredicate::Text {
                    key: key.to_string(),
                    base: parsed.base,
                    quantifier: parsed.quantifier,
                    matchers,
                });
            }
        }

        Ok(CompiledSearch { text, filters })
    }

    /// The table to yield if `table` passes every key, else `None`.
    ///
    /// The returned table is `table` itself unless a transform substituted
    /// it.
    pub fn evaluate(&self, table: Table) -> Option<Table> {
        let mut table = table;
        for predicate in self.text.iter().chain(&self.filters) {
            match predicate.apply(table) {
                Some(next) => table = next,
                None => {
                    debug!("predicate {:?} rejected a table", predicate.key());
                    return None;
                }
            }
        }
        Some(table)
    }

    /// Lazily keep the tables of `tables` that pass.
    pub fn filter_tables<I>(self, tables: I) -> SearchResults<I::IntoIter>
    where
        I: IntoIterator<Item = Table>,
    {
        SearchResults {
            tables: tables.into_iter(),
            search: self,
        }
    }
}

impl CompiledPredicate {
    fn key(&self) -> &str {
        match self {
            CompiledPredicate::Text { key, .. } | CompiledPredicate::Filter { key, .. } => key,
        }
    }

    fn apply(&self, table: Table) -> Option<Table> {
        match self {
            CompiledPredicate::Text {
                base,
                quantifier,
                matchers,
                ..
            } => {
                let targets = matcher::targets(*base, table.metadata());
                let hit = |m: &TextMatcher| m.matches_any(&targets);
                let passed = match quantifier {
                    Quantifier::Any => matchers.iter().any(hit),
                    Quantifier::All => matchers.iter().all(hit),
                };
                passed.then_some(table)
            }
            CompiledPredicate::Filter { values, .. } => {
                for value in values {
                    match value {
                        FilterValue::Rows(p) => {
                            if p.matches_any(table.data()) {
                                return Some(table);
                            }
                        }
                        FilterValue::Transform(t) => match t.apply(&table) {
                            FilterOutcome::Keep => return Some(table),
                            FilterOutcome::Replace(replacement) => return Some(replacement),
                            FilterOutcome::Reject => {}
                        },
                    }
                }
                None
            }
        }
    }
}

/// Lazy stream of tables that passed a [`CompiledSearch`].
#[derive(Debug)]
pub struct SearchResults<I = CatalogWalker> {
    tables: I,
    search: CompiledSearch,
}

impl<I: Iterator<Item = Table>> Iterator for SearchResults<I> {
    type Item = Table;

    fn next(&mut self) -> Option<Table> {
        for table in self.tables.by_ref() {
            if let Some(found) = self.search.evaluate(table) {
                return Some(found);
            }
        }
        None
    }
}

/// Search the catalog under `root`.
///
/// Predicates are validated before the walk starts; tables are loaded and
/// tested one at a time as the result is iterated.
pub fn search(
    predicates: &Predicates,
    root: impl AsRef<Path>,
) -> Result<SearchResults, SearchError> {
    let compiled = CompiledSearch::compile(predicates)?;
    Ok(compiled.filter_tables(catalog::walk(root)))
}

/// Search an in-memory collection of tables, such as the result of a
/// remote fetch.
pub fn search_in<I>(
    predicates: &Predicates,
    tables: I,
) -> Result<SearchResults<I::IntoIter>, SearchError>
where
    I: IntoIterator<Item = Table>,
{
    Ok(CompiledSearch::compile(predicates)?.filter_tables(tables))
}
