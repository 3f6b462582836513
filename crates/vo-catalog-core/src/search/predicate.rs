//! Predicate keys and values.
//!
//! A key is `<base>[_<suffix>...]`. Bases are `name`, `title`,
//! `description`, `field_<attr>` and `filter`. Suffixes are one match
//! strategy (`regex`, `not`, `like`) and/or the `all` quantifier, in either
//! order. Keys are case-insensitive.

use std::fmt;

use snafu::prelude::*;

use crate::{
    metadata::FieldAttr,
    search::{
        error::{
            ConflictingSuffixSnafu, DuplicateSuffixSnafu, FilterSuffixSnafu, SearchError,
            UnknownFieldAttrSnafu, UnknownKeySnafu,
        },
        filter::{RowPredicate, TableTransform},
    },
};

/// What a key matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKey {
    /// The table's name.
    Name,
    /// The table's title.
    Title,
    /// The table's description.
    Description,
    /// One attribute across all of the table's fields.
    Field(FieldAttr),
    /// Row predicates and table transforms.
    Filter,
}

/// How a text value is compared with its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Case-folded equality.
    #[default]
    Exact,
    /// Regular expression matched from the start of the target.
    Regex,
    /// Case-folded inequality.
    Not,
    /// SQL `LIKE` pattern.
    Like,
}

impl MatchStrategy {
    fn suffix(self) -> &'static str {
        match self {
            MatchStrategy::Exact => "",
            MatchStrategy::Regex => "regex",
            MatchStrategy::Not => "not",
            MatchStrategy::Like => "like",
        }
    }
}

/// How the values of one key combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantifier {
    /// At least one value must match.
    #[default]
    Any,
    /// Every value must match.
    All,
}

/// A parsed predicate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateKey {
    /// Match target.
    pub base: BaseKey,
    /// Comparison.
    pub strategy: MatchStrategy,
    /// Value combination.
    pub quantifier: Quantifier,
}

const STRATEGY_SUFFIXES: [(&str, MatchStrategy); 3] = [
    ("_regex", MatchStrategy::Regex),
    ("_not", MatchStrategy::Not),
    ("_like", MatchStrategy::Like),
];

impl PredicateKey {
    /// Parse a key such as `name`, `field_ucd_regex` or `title_all_not`.
    pub fn parse(key: &str) -> Result<Self, SearchError> {
        let folded = key.to_lowercase();
        let mut rest = folded.as_str();
        let mut strategy: Option<MatchStrategy> = None;
        let mut quantifier: Option<Quantifier> = None;

        loop {
            if let Some(stripped) = rest.strip_suffix("_all") {
                ensure!(
                    quantifier.is_none(),
                    DuplicateSuffixSnafu { key, suffix: "all" }
                );
                quantifier = Some(Quantifier::All);
                rest = stripped;
                continue;
            }

            let Some((stripped, found)) = STRATEGY_SUFFIXES
                .iter()
                .find_map(|(sfx, s)| rest.strip_suffix(sfx).map(|r| (r, *s)))
            else {
                break;
            };

            match strategy {
                Some(prev) if prev == found => {
                    return DuplicateSuffixSnafu {
                        key,
                        suffix: found.suffix(),
                    }
                    .fail();
                }
                Some(prev) => {
                    return ConflictingSuffixSnafu {
                        key,
                        first: prev.suffix(),
                        second: found.suffix(),
                    }
                    .fail();
                }
                None => strategy = Some(found),
            }
            rest = stripped;
        }

        let base = match rest {
            "name" => BaseKey::Name,
            "title" => BaseKey::Title,
            "description" => BaseKey::Description,
            "filter" => BaseKey::Filter,
            other => match other.strip_prefix("field_") {
                Some(attr) => BaseKey::Field(
                    FieldAttr::parse(attr).context(UnknownFieldAttrSnafu { key, attr })?,
                ),
                None => return UnknownKeySnafu { key }.fail(),
            },
        };

        ensure!(
            base != BaseKey::Filter || (strategy.is_none() && quantifier.is_none()),
            FilterSuffixSnafu { key }
        );

        Ok(PredicateKey {
            base,
            strategy: strategy.unwrap_or_default(),
            quantifier: quantifier.unwrap_or_default(),
        })
    }
}

/// One search value.
#[derive(Debug, Clone)]
pub enum PredicateValue {
    /// A string to compare, or a regex/LIKE pattern.
    Text(String),
    /// A row predicate (`filter` only).
    Rows(RowPredicate),
    /// A table transform (`filter` only).
    Transform(TableTransform),
}

impl PredicateValue {
    /// Short name of the value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PredicateValue::Text(_) => "text",
            PredicateValue::Rows(_) => "row predicate",
            PredicateValue::Transform(_) => "table transform",
        }
    }
}

impl From<&str> for PredicateValue {
    fn from(value: &str) -> Self {
        PredicateValue::Text(value.to_string())
    }
}

impl From<String> for PredicateValue {
    fn from(value: String) -> Self {
        PredicateValue::Text(value)
    }
}

impl From<RowPredicate> for PredicateValue {
    fn from(value: RowPredicate) -> Self {
        PredicateValue::Rows(value)
    }
}

impl From<TableTransform> for PredicateValue {
    fn from(value: TableTransform) -> Self {
        PredicateValue::Transform(value)
    }
}

/// The values given for one key. A single value is a one-element list.
#[derive(Debug, Clone, Default)]
pub struct PredicateValues(pub Vec<PredicateValue>);

macro_rules! single_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PredicateValues {
                fn from(value: $ty) -> Self {
                    PredicateValues(vec![value.into()])
                }
            }
        )*
    };
}

single_value!(&str, String, RowPredicate, TableTransform, PredicateValue);

impl<T: Into<PredicateValue>> From<Vec<T>> for PredicateValues {
    fn from(values: Vec<T>) -> Self {
        PredicateValues(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PredicateValue>, const N: usize> From<[T; N]> for PredicateValues {
    fn from(values: [T; N]) -> Self {
        PredicateValues(values.into_iter().map(Into::into).collect())
    }
}

/// An ordered map of search keys to values.
///
/// ```
/// use vo_catalog_core::search::Predicates;
///
/// let predicates = Predicates::new()
///     .with("name_like", "2mass%")
///     .with("field_ucd", ["phot.mag;em.ir.j", "phot.mag;em.ir.h"]);
/// assert_eq!(predicates.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Predicates {
    entries: Vec<(String, Vec<PredicateValue>)>,
}

impl Predicates {
    /// No predicates; matches every table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::insert`].
    pub fn with(mut self, key: impl Into<String>, values: impl Into<PredicateValues>) -> Self {
        self.insert(key, values);
        self
    }

    /// Add values under `key`, extending any values already given for the
    /// same key.
    pub fn insert(&mut self, key: impl Into<String>, values: impl Into<PredicateValues>) {
        let key = key.into();
        let PredicateValues(values) = values.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.extend(values),
            None => self.entries.push((key, values)),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys and their values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PredicateValue])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for Predicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, values)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}=")?;
            for (j, value) in values.iter().enumerate() {
                if j > 0 {
                    f.write_str("|")?;
                }
                match value {
                    PredicateValue::Text(text) => write!(f, "{text:?}")?,
                    PredicateValue::Rows(p) => write!(f, "<{}>", p.label())?,
                    PredicateValue::Transform(t) => write!(f, "<{}>", t.label())?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(key: &str) -> PredicateKey {
        PredicateKey::parse(key).unwrap()
    }

    #[test]
    fn plain_keys() {
        let key = parse("Name");
        assert_eq!(key.base, BaseKey::Name);
        assert_eq!(key.strategy, MatchStrategy::Exact);
        assert_eq!(key.quantifier, Quantifier::Any);

        assert_eq!(parse("field_ucd").base, BaseKey::Field(FieldAttr::Ucd));
        assert_eq!(parse("filter").base, BaseKey::Filter);
    }

    #[test]
    fn suffixes_in_either_order() {
        for raw in ["title_regex_all", "title_all_regex", "TITLE_ALL_REGEX"] {
            let key = parse(raw);
            assert_eq!(key.base, BaseKey::Title, "{raw}");
            assert_eq!(key.strategy, MatchStrategy::Regex, "{raw}");
            assert_eq!(key.quantifier, Quantifier::All, "{raw}");
        }
        assert_eq!(parse("field_name_not").base, BaseKey::Field(FieldAttr::Name));
        assert_eq!(parse("description_like").strategy, MatchStrategy::Like);
    }

    #[test]
    fn rejects_bad_keys() {
        let err = |raw: &str| PredicateKey::parse(raw).unwrap_err();

        assert!(matches!(err("colour"), SearchError::UnknownKey { .. }));
        assert!(matches!(err("field"), SearchError::UnknownKey { .. }));
        assert!(matches!(err("field_bogus"), SearchError::UnknownFieldAttr { attr, .. } if attr == "bogus"));
        assert!(matches!(err("name_not_not"), SearchError::DuplicateSuffix { .. }));
        assert!(matches!(err("name_all_all"), SearchError::DuplicateSuffix { .. }));
        assert!(matches!(err("name_regex_not"), SearchError::ConflictingSuffix { .. }));
        assert!(matches!(err("filter_not"), SearchError::FilterSuffix { .. }));
        assert!(matches!(err("filter_all"), SearchError::FilterSuffix { .. }));
    }

    #[test]
    fn insert_accumulates_values_per_key() {
        let mut p = Predicates::new().with("name", "foo");
        p.insert("name", vec!["bar", "baz"]);
        p.insert("title", String::from("T"));

        let entries: Vec<_> = p.iter().map(|(k, v)| (k.to_string(), v.len())).collect();
        assert_eq!(entries, [("name".to_string(), 3), ("title".to_string(), 1)]);
        assert_eq!(p.to_string(), r#"name="foo"|"bar"|"baz", title="T""#);
    }
}
