//! Error types for the PDF stamping library

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Which input of an operation failed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    /// The document being numbered by `stamp_pdf`
    Base,
    /// The first-page header overlay passed to `stamp_pdf`
    Overlay,
    /// The document stamped in place by `put_image` / `put_text`
    Target,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRole::Base => write!(f, "base document"),
            SourceRole::Overlay => write!(f, "first-page overlay"),
            SourceRole::Target => write!(f, "target document"),
        }
    }
}

/// Main error type for the PDF stamping library
#[derive(Error, Debug)]
pub enum Error {
    /// A source PDF could not be read at all
    #[error("{role} not found: {origin}")]
    NotFound {
        role: SourceRole,
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// A source was read but is not a parseable PDF
    #[error("{role} is not a valid PDF: {origin}")]
    Malformed {
        role: SourceRole,
        origin: String,
        #[source]
        source: lopdf::Error,
    },

    /// A source PDF parsed but has no pages to work on
    #[error("{role} has no pages: {origin}")]
    NoPages { role: SourceRole, origin: String },

    /// Unrecognised page number enclosure key
    #[error("Invalid number enclosure: {0} (expected one of en_dash, em_dash, minus, parens, page, Page)")]
    InvalidEnclosure(String),

    /// Page numbers run past the largest representable number
    #[error("Page numbers overflow: {pages} pages starting at {start}")]
    NumberOverflow { start: u32, pages: usize },

    /// Font name is not one of the standard PDF fonts
    #[error("Unknown font: {0}")]
    UnknownFont(String),

    /// Image file missing or undecodable
    #[error("Cannot use image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The failing input's role, for load failures
    pub fn role(&self) -> Option<SourceRole> {
        match self {
            Error::NotFound { role, .. }
            | Error::Malformed { role, .. }
            | Error::NoPages { role, .. } => Some(*role),
            _ => None,
        }
    }
}
