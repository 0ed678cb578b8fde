//! URL handling module for dredge
//!
//! This module provides the normalized `UrlRecord` value used throughout the
//! frontier and include/exclude wildcard filtering for discovered URLs.

mod matcher;
mod record;

pub use matcher::{matches_pattern, UrlFilter};
pub use record::UrlRecord;
