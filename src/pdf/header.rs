//! Logo-and-text header pages
//!
//! The header is a single A4 page meant to be passed to
//! [`stamp_pdf`](crate::pdf::stamp::stamp_pdf) as its first-page overlay.

use std::path::PathBuf;
use crate::error::Result;
use crate::pdf::canvas::Canvas;
use crate::pdf::fonts::{StandardFont, DEFAULT_FONT};
use crate::pdf::image::ImageXObject;
use crate::pdf::io::PdfSink;
use crate::units::{mm, PageSize};

/// Distance between header text lines
pub const HEADER_LINE_PITCH_MM: f32 = 4.0;

/// Gap between logo and text, as a fraction of the logo width
const LOGO_TEXT_GAP: f32 = 1.15;

/// Options for [`put_logo_with_text`]
///
/// Positions and sizes are in points.
#[derive(Debug, Clone)]
pub struct LogoTextOptions {
    pub text_lines: Vec<String>,
    pub logo_file: Option<PathBuf>,
    /// Left edge of the logo
    pub pos_x: f32,
    /// Bottom edge of the logo
    pub pos_y: f32,
    pub logo_width: f32,
    pub fontsize: f32,
    pub font: StandardFont,
}

impl Default for LogoTextOptions {
    fn default() -> Self {
        Self {
            text_lines: Vec::new(),
            logo_file: None,
            pos_x: mm(84.0),
            pos_y: mm(272.0),
            logo_width: mm(18.0),
            fontsize: 8.0,
            font: DEFAULT_FONT,
        }
    }
}

/// Draw a logo with text lines to its right onto a fresh A4 page
///
/// The text block is vertically centred on the logo, first line on top.
/// With neither logo nor text a blank page is written.
///
/// # Example
///
/// ```no_run
/// use pdf_stamp_tools::pdf::{put_logo_with_text, LogoTextOptions};
///
/// let options = LogoTextOptions {
///     text_lines: vec!["Course 101".to_string(), "Lecture notes".to_string()],
///     logo_file: Some("logo.png".into()),
///     ..Default::default()
/// };
/// put_logo_with_text("header.pdf", &options)?;
/// # Ok::<(), pdf_stamp_tools::Error>(())
/// ```
pub fn put_logo_with_text<'a>(output: impl Into<PdfSink<'a>>, options: &LogoTextOptions) -> Result<()> {
    let mut canvas = Canvas::new(PageSize::a4());
    draw_logo_with_text(&mut canvas, options)?;

    let bytes = canvas.finish()?;
    output.into().write_pdf(&bytes)?;

    log::info!("Wrote header with {} text lines", options.text_lines.len());
    Ok(())
}

fn draw_logo_with_text(canvas: &mut Canvas, options: &LogoTextOptions) -> Result<()> {
    let (logo_width, logo_height) = match options.logo_file {
        Some(ref path) => {
            let logo = ImageXObject::open(path)?;
            let height = logo.height_for_width(options.logo_width);
            canvas.draw_image(&logo, options.pos_x, options.pos_y, options.logo_width, height);
            (options.logo_width, height)
        }
        None => (0.0, 0.0),
    };

    if options.text_lines.is_empty() {
        return Ok(());
    }

    let x = options.pos_x + logo_width * LOGO_TEXT_GAP;
    let y0 = options.pos_y + logo_height / 2.0 + mm(1.0) * (options.text_lines.len() - 1) as f32;

    for (index, line) in options.text_lines.iter().enumerate() {
        canvas.set_font(options.font, options.fontsize);
        canvas.draw_string(x, y0 - mm(HEADER_LINE_PITCH_MM) * index as f32, line);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pdf::merge::page_content;
    use crate::pdf::metadata::page_ids;
    use lopdf::content::Content;
    use lopdf::{Document, Object};

    fn number(obj: &Object) -> f32 {
        match obj {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            other => panic!("not a number: {:?}", other),
        }
    }

    /// (x, y) of every Td operator on the only page
    fn text_origins(bytes: &[u8]) -> Vec<(f32, f32)> {
        let doc = Document::load_mem(bytes).unwrap();
        let content = page_content(&doc, page_ids(&doc)[0]).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Td")
            .map(|op| (number(&op.operands[0]), number(&op.operands[1])))
            .collect()
    }

    #[test]
    fn test_blank_header() {
        let mut output = Vec::new();
        put_logo_with_text(&mut output, &LogoTextOptions::default()).unwrap();

        let doc = Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(text_origins(&output).is_empty());
    }

    #[test]
    fn test_text_without_logo() {
        let options = LogoTextOptions {
            text_lines: vec!["one".into(), "two".into(), "three".into()],
            ..Default::default()
        };
        let mut output = Vec::new();
        put_logo_with_text(&mut output, &options).unwrap();

        let origins = text_origins(&output);
        assert_eq!(origins.len(), 3);
        // No logo: text starts at pos_x, block top is 2 mm above pos_y
        for (index, (x, y)) in origins.iter().enumerate() {
            assert!((x - mm(84.0)).abs() < 0.01);
            let expected = mm(272.0) + mm(2.0) - mm(4.0) * index as f32;
            assert!((y - expected).abs() < 0.01);
        }
    }

    #[test]
    fn test_missing_logo_fails() {
        let options = LogoTextOptions {
            logo_file: Some(PathBuf::from("missing-logo.png")),
            ..Default::default()
        };
        let mut output = Vec::new();
        let err = put_logo_with_text(&mut output, &options).unwrap_err();
        assert!(matches!(err, Error::Image { .. }));
        assert!(output.is_empty());
    }

    #[test]
    fn test_default_options() {
        let options = LogoTextOptions::default();
        assert!((options.pos_x - 238.11).abs() < 0.01);
        assert!((options.logo_width - 51.02).abs() < 0.01);
        assert_eq!(options.fontsize, 8.0);
        assert_eq!(options.font, StandardFont::TimesRoman);
    }
}
