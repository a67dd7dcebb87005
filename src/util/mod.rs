//! Terminal-safe text helpers used when printing parsed feed groups.
//!
//! Titles and descriptions come straight from uploaded files, so they are
//! sanitized before printing and truncated to the configured column budget.

mod text;

pub use text::{sanitize_line, truncate_to_width};
