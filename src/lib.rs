//! PDF Stamp Tools Library
//!
//! A library for stamping existing PDFs.
//! This library provides functionality to:
//! - Number every page of a document, continuing across documents
//! - Build a logo-and-text header page and put it on a document's first page
//! - Place a single image or block of text on a document's first page
//! - Inspect page counts and page sizes
//!
//! # Example
//!
//! ```no_run
//! use pdf_stamp_tools::pdf::{put_logo_with_text, stamp_pdf, LogoTextOptions, PdfSource, StampOptions};
//! use pdf_stamp_tools::numbering::NumberEnclosure;
//!
//! let mut header = Vec::new();
//! let header_options = LogoTextOptions {
//!     text_lines: vec!["Advanced Topics".to_string()],
//!     logo_file: Some("logo.png".into()),
//!     ..Default::default()
//! };
//! put_logo_with_text(&mut header, &header_options)?;
//!
//! let options = StampOptions {
//!     first_page_overlay: Some(PdfSource::from(header)),
//!     enclosure: NumberEnclosure::Parens,
//!     ..Default::default()
//! };
//! let next_page = stamp_pdf("notes.pdf", "notes-stamped.pdf", &options)?;
//! println!("next document starts at page {}", next_page);
//! # Ok::<(), pdf_stamp_tools::Error>(())
//! ```

pub mod error;
pub mod numbering;
pub mod pdf;
pub mod units;

// Re-export commonly used items
pub use error::{Error, Result, SourceRole};
pub use numbering::{format_number, NumberEnclosure};
