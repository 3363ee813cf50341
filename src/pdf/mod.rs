//! PDF manipulation module

pub mod canvas;
pub mod fonts;
pub mod header;
pub mod image;
pub mod io;
pub mod merge;
pub mod metadata;
pub mod place;
pub mod stamp;

// Re-export commonly used items
pub use canvas::Canvas;
pub use fonts::{StandardFont, DEFAULT_FONT};
pub use header::{put_logo_with_text, LogoTextOptions};
pub use io::{PdfSink, PdfSource, StampTarget};
pub use merge::OverlayMerger;
pub use metadata::{count_pages, pdf_info, PageBox, PdfInfo};
pub use place::{put_image, put_text, ImageStamp, TextStamp};
pub use stamp::{generate_numbering_overlay, stamp_pdf, StampOptions};
