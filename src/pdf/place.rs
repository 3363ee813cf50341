//! Single images and text blocks placed on an existing document's first page
//!
//! The target is read fully, stamped in memory and then replaced. Every page
//! of the target is kept.

use std::path::PathBuf;
use crate::error::Result;
use crate::pdf::canvas::Canvas;
use crate::pdf::fonts::{StandardFont, DEFAULT_FONT};
use crate::pdf::image::ImageXObject;
use crate::pdf::io::{document_bytes, StampTarget};
use crate::pdf::merge::OverlayMerger;
use crate::pdf::metadata::page_ids;
use crate::units::{mm, PageSize};

/// Distance between text block lines
pub const TEXT_LINE_PITCH_MM: f32 = 3.2;

/// An image to place, scaled to `img_width` with its aspect ratio kept
#[derive(Debug, Clone)]
pub struct ImageStamp {
    pub img_file: PathBuf,
    pub img_width: f32,
    /// Lower-left corner
    pub x: f32,
    pub y: f32,
}

/// Text lines to place, first line's baseline at (x, y)
#[derive(Debug, Clone)]
pub struct TextStamp {
    pub text_lines: Vec<String>,
    pub x: f32,
    pub y: f32,
    pub fontsize: f32,
    pub font: StandardFont,
}

impl Default for TextStamp {
    fn default() -> Self {
        Self {
            text_lines: Vec::new(),
            x: 0.0,
            y: 0.0,
            fontsize: 8.0,
            font: DEFAULT_FONT,
        }
    }
}

/// Place an image on the first page of `target`
pub fn put_image<'a>(target: impl Into<StampTarget<'a>>, stamp: &ImageStamp) -> Result<()> {
    stamp_first_page(target.into(), |canvas| {
        let image = ImageXObject::open(&stamp.img_file)?;
        let height = image.height_for_width(stamp.img_width);
        canvas.draw_image(&image, stamp.x, stamp.y, stamp.img_width, height);
        Ok(())
    })
}

/// Place lines of text on the first page of `target`
pub fn put_text<'a>(target: impl Into<StampTarget<'a>>, stamp: &TextStamp) -> Result<()> {
    stamp_first_page(target.into(), |canvas| {
        for (index, line) in stamp.text_lines.iter().enumerate() {
            canvas.set_font(stamp.font, stamp.fontsize);
            canvas.draw_string(stamp.x, stamp.y - mm(TEXT_LINE_PITCH_MM) * index as f32, line);
        }
        Ok(())
    })
}

/// Draw on an A4 canvas and merge it onto the target's first page
fn stamp_first_page<F>(target: StampTarget<'_>, draw: F) -> Result<()>
where
    F: FnOnce(&mut Canvas) -> Result<()>,
{
    let mut doc = target.load()?;
    let pages = page_ids(&doc);

    let mut canvas = Canvas::new(PageSize::a4());
    draw(&mut canvas)?;
    let overlay = canvas.into_document();

    if let (Some(&first), Some(&overlay_page)) = (pages.first(), page_ids(&overlay).first()) {
        OverlayMerger::new(&overlay).merge_page(&mut doc, first, overlay_page)?;
    }

    let bytes = document_bytes(&mut doc)?;
    log::info!("Stamped first page of {} ({} pages kept)", target.origin(), pages.len());
    target.replace(bytes)
}
