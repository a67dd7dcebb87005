//! Validation of uploaded OPML files before they are shared.
//!
//! An upload is accepted only if it is present, within the size cap, valid
//! UTF-8, and parses as OPML. The accepted text is kept verbatim next to its
//! parsed groups; the raw text is what gets stored, and readers re-parse it.
use std::path::Path;

use thiserror::Error;

use crate::opml::{parse_opml_str, FeedGroup, OpmlError};

/// Default upload cap (1 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1_048_576;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("OPML file is required")]
    Missing,

    #[error("OPML file is too large ({size} bytes, max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("OPML file is not valid UTF-8")]
    NotUtf8,

    #[error("Invalid OPML file")]
    Invalid(#[from] OpmlError),

    #[error("Failed to read OPML file: {0}")]
    Io(#[from] std::io::Error),
}

/// An upload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOpml {
    /// The uploaded text, byte-for-byte.
    pub raw: String,
    pub groups: Vec<FeedGroup>,
}

impl ValidatedOpml {
    /// Total number of feeds across all groups.
    pub fn feed_count(&self) -> usize {
        self.groups.iter().map(|g| g.feeds.len()).sum()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Validates an uploaded OPML payload.
///
/// # Errors
///
/// - [`UploadError::Missing`] when no file was supplied
/// - [`UploadError::TooLarge`] when the payload exceeds `max_bytes`
/// - [`UploadError::NotUtf8`] when the payload is not UTF-8 text
/// - [`UploadError::Invalid`] when the text does not parse as OPML
pub fn validate_upload(bytes: Option<&[u8]>, max_bytes: u64) -> Result<ValidatedOpml, UploadError> {
    let bytes = bytes.ok_or(UploadError::Missing)?;

    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(UploadError::TooLarge {
            size,
            max: max_bytes,
        });
    }

    let raw = std::str::from_utf8(bytes).map_err(|_| UploadError::NotUtf8)?;
    let groups = parse_opml_str(raw).inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected OPML upload");
    })?;

    let validated = ValidatedOpml {
        raw: raw.to_string(),
        groups,
    };
    tracing::info!(
        bytes = size,
        groups = validated.group_count(),
        feeds = validated.feed_count(),
        "Accepted OPML upload"
    );
    Ok(validated)
}

/// Validates an OPML file on disk.
///
/// The size cap is checked against file metadata before anything is read.
pub async fn validate_upload_file(path: &Path, max_bytes: u64) -> Result<ValidatedOpml, UploadError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(UploadError::Missing),
        Err(e) => return Err(UploadError::Io(e)),
    };
    if metadata.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: metadata.len(),
            max: max_bytes,
        });
    }

    let bytes = tokio::fs::read(path).await?;
    validate_upload(Some(&bytes), max_bytes)
}

/// Whether `content` parses as OPML.
pub fn is_valid_opml(content: &str) -> bool {
    parse_opml_str(content).is_ok()
}
