//! Parse OPML subscription exports into shareable feed collections.
//!
//! - [`opml`] - OPML parsing, normalization into two-level feed groups, export
//! - [`upload`] - Size, encoding and format checks for uploaded files
//! - [`render`] - Text and JSON rendering of parsed groups
//! - [`config`] - Optional TOML configuration
//! - [`util`] - Terminal-safe text helpers

pub mod config;
pub mod opml;
pub mod render;
pub mod upload;
pub mod util;
