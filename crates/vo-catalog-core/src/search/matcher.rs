//! Text matching for the non-`filter` keys.

use regex::{Regex, RegexBuilder};
use snafu::prelude::*;

use crate::{
    metadata::TableMetadata,
    search::{
        error::{InvalidPatternSnafu, SearchError},
        predicate::{BaseKey, MatchStrategy},
    },
};

/// Translate a SQL `LIKE` pattern into an anchored regular expression.
///
/// `%` matches any run of characters and `_` exactly one; a backslash makes
/// the next character literal. Everything else matches itself.
///
/// ```
/// use vo_catalog_core::search::like_to_regex;
///
/// assert_eq!(like_to_regex("2mass_%"), "^2mass..*$");
/// assert_eq!(like_to_regex("a.b"), r"^a\.b$");
/// ```
pub fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' => match chars.next() {
                Some(next) => out.push_str(&regex::escape(next.encode_utf8(&mut [0; 4]))),
                None => out.push_str(r"\\"),
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

/// One compiled text value.
#[derive(Debug, Clone)]
pub(crate) enum TextMatcher {
    /// Equal to this case-folded string.
    Exact(String),
    /// Not equal to this case-folded string.
    Not(String),
    /// Regex or translated `LIKE` pattern.
    Pattern(Regex),
}

impl TextMatcher {
    pub(crate) fn compile(
        key: &str,
        strategy: MatchStrategy,
        value: &str,
    ) -> Result<Self, SearchError> {
        let pattern = match strategy {
            MatchStrategy::Exact => return Ok(TextMatcher::Exact(value.to_lowercase())),
            MatchStrategy::Not => return Ok(TextMatcher::Not(value.to_lowercase())),
            // `re.match` semantics: anchored at the start only.
            MatchStrategy::Regex => format!("^(?:{value})"),
            MatchStrategy::Like => like_to_regex(value),
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .dot_matches_new_line(strategy == MatchStrategy::Like)
            .build()
            .map(TextMatcher::Pattern)
            .context(InvalidPatternSnafu {
                key,
                pattern: value,
            })
    }

    /// True when any of the (case-folded) targets satisfies the matcher.
    pub(crate) fn matches_any(&self, targets: &[String]) -> bool {
        targets.iter().any(|t| match self {
            TextMatcher::Exact(v) => t == v,
            TextMatcher::Not(v) => t != v,
            TextMatcher::Pattern(re) => re.is_match(t),
        })
    }
}

/// The case-folded strings `base` refers to in `metadata`.
///
/// Table-level keys give one target; `field_<attr>` gives one per field.
pub(crate) fn targets(base: BaseKey, metadata: &TableMetadata) -> Vec<String> {
    match base {
        BaseKey::Name => vec![metadata.name().to_lowercase()],
        BaseKey::Title => vec![metadata.title().to_lowercase()],
        BaseKey::Description => vec![metadata.description().to_lowercase()],
        BaseKey::Field(attr) => metadata
            .fields()
            .iter()
            .map(|f| f.attr(attr).to_lowercase())
            .collect(),
        BaseKey::Filter => Vec::new(),
    }
}
