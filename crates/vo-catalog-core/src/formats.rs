//! Format-specific helpers.
//!
//! This module is the home for I/O helpers tied to a particular on-disk data
//! format. Saved tables currently store their rows as Parquet.

pub mod parquet;
