//! Predicate errors.
//!
//! Every variant describes a caller mistake and is raised while compiling
//! predicates, before any table folder is read.

use snafu::prelude::*;

/// A predicate map that cannot be evaluated.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SearchError {
    /// The key's base is not `name`, `title`, `description`, `field_<attr>`
    /// or `filter`.
    #[snafu(display("Unknown search key {key:?}"))]
    UnknownKey {
        /// Key as given.
        key: String,
    },

    /// `field_<attr>` names an attribute fields do not have.
    #[snafu(display("Search key {key:?} names unknown field attribute {attr:?}"))]
    UnknownFieldAttr {
        /// Key as given.
        key: String,
        /// The unrecognized attribute.
        attr: String,
    },

    /// The same suffix appears twice.
    #[snafu(display("Search key {key:?} repeats the _{suffix} suffix"))]
    DuplicateSuffix {
        /// Key as given.
        key: String,
        /// Repeated suffix.
        suffix: String,
    },

    /// More than one of `_regex`, `_not`, `_like`.
    #[snafu(display("Search key {key:?} combines the _{first} and _{second} suffixes"))]
    ConflictingSuffix {
        /// Key as given.
        key: String,
        /// Outermost strategy suffix.
        first: String,
        /// Inner strategy suffix.
        second: String,
    },

    /// `filter` takes no suffix.
    #[snafu(display("Search key {key:?}: filter does not take a suffix"))]
    FilterSuffix {
        /// Key as given.
        key: String,
    },

    /// The key was given an empty value list.
    #[snafu(display("Search key {key:?} has no values"))]
    NoValues {
        /// Key as given.
        key: String,
    },

    /// A text key got a filter value or `filter` got text.
    #[snafu(display("Search key {key:?} expects a {expected} value, got a {found}"))]
    InvalidValueKind {
        /// Key as given.
        key: String,
        /// What the key accepts.
        expected: &'static str,
        /// What it was given.
        found: &'static str,
    },

    /// A `_regex` or `_like` value does not compile.
    #[snafu(display("Search key {key:?} has an invalid pattern {pattern:?}: {source}"))]
    InvalidPattern {
        /// Key as given.
        key: String,
        /// The pattern as given.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },
}
