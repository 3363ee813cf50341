//! Page numbering for whole documents
//!
//! A numbering overlay with one page per base page is drawn first, sized to
//! match each base page exactly. An optional first-page overlay (usually a
//! logo header made by [`put_logo_with_text`](crate::pdf::header::put_logo_with_text))
//! is composited onto the first numbering page, and then every numbering page
//! is merged onto its base page.

use lopdf::Document;
use crate::error::{Error, Result, SourceRole};
use crate::numbering::{format_number, NumberEnclosure};
use crate::pdf::canvas::Canvas;
use crate::pdf::fonts::{StandardFont, DEFAULT_FONT};
use crate::pdf::io::{document_bytes, PdfSink, PdfSource};
use crate::pdf::merge::OverlayMerger;
use crate::pdf::metadata::{page_box, page_ids};
use crate::units::{mm, PageSize};

/// Font size of page numbers
pub const NUMBER_FONT_SIZE: f32 = 11.0;

/// Options for [`stamp_pdf`]
#[derive(Debug, Clone)]
pub struct StampOptions {
    /// Drawn on the first page only, on top of its number
    pub first_page_overlay: Option<PdfSource>,
    pub enclosure: NumberEnclosure,
    /// Number printed on the first page
    pub start_num: u32,
    /// Baseline of the number above the page bottom, in points
    pub vertical_offset: f32,
    pub font: StandardFont,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self {
            first_page_overlay: None,
            enclosure: NumberEnclosure::default(),
            start_num: 1,
            vertical_offset: mm(10.5),
            font: DEFAULT_FONT,
        }
    }
}

/// Draw one numbered page for every page of `base`
///
/// Page `i` is sized like base page `i` and shows `start_num + i`,
/// horizontally centred. Fails if a page number would not fit in a `u32`.
pub fn generate_numbering_overlay(
    base: &Document,
    start_num: u32,
    vertical_offset: f32,
    enclosure: NumberEnclosure,
    font: StandardFont,
) -> Result<Document> {
    let pages = page_ids(base);
    let mut canvas = Canvas::new(PageSize::a4());

    for (index, &page_id) in pages.iter().enumerate() {
        let page_box = page_box(base, page_id);
        canvas.set_page_size(page_box.size());
        canvas.set_font(font, NUMBER_FONT_SIZE);

        let number = u32::try_from(index)
            .ok()
            .and_then(|offset| start_num.checked_add(offset))
            .ok_or(Error::NumberOverflow { start: start_num, pages: pages.len() })?;
        let label = format_number(number, enclosure);
        canvas.draw_centred_string(page_box.width() / 2.0, vertical_offset, &label);
        canvas.show_page();
    }

    log::debug!("Generated numbering overlay with {} pages", canvas.page_count());
    Ok(canvas.into_document())
}

/// The number following `pages` pages numbered from `start_num`
fn next_number(start_num: u32, pages: usize) -> Result<u32> {
    u32::try_from(pages)
        .ok()
        .and_then(|count| start_num.checked_add(count))
        .ok_or(Error::NumberOverflow { start: start_num, pages })
}

/// Number every page of `input` and write the result to `output`
///
/// Returns the number the page after the last one would get, so several
/// documents can be numbered continuously.
///
/// # Example
///
/// ```no_run
/// use pdf_stamp_tools::pdf::{stamp_pdf, StampOptions};
///
/// let next = stamp_pdf("chapter1.pdf", "chapter1-numbered.pdf", &StampOptions::default())?;
/// let options = StampOptions { start_num: next, ..Default::default() };
/// stamp_pdf("chapter2.pdf", "chapter2-numbered.pdf", &options)?;
/// # Ok::<(), pdf_stamp_tools::Error>(())
/// ```
pub fn stamp_pdf<'a>(
    input: impl Into<PdfSource>,
    output: impl Into<PdfSink<'a>>,
    options: &StampOptions,
) -> Result<u32> {
    let input = input.into();

    let header = match options.first_page_overlay {
        Some(ref source) => Some(source.load_with_pages(SourceRole::Overlay)?),
        None => None,
    };

    let mut base = input.load(SourceRole::Base)?;
    let base_pages = page_ids(&base);
    let next = next_number(options.start_num, base_pages.len())?;

    let mut numbering = generate_numbering_overlay(
        &base,
        options.start_num,
        options.vertical_offset,
        options.enclosure,
        options.font,
    )?;

    if let Some(ref header) = header {
        let numbering_pages = page_ids(&numbering);
        // An empty base gives an empty numbering overlay and nothing to put a header on
        if let (Some(&first), Some(&header_page)) = (numbering_pages.first(), page_ids(header).first()) {
            OverlayMerger::new(header).merge_page(&mut numbering, first, header_page)?;
        }
    }

    {
        let mut merger = OverlayMerger::new(&numbering);
        for (&page_id, overlay_page) in base_pages.iter().zip(page_ids(&numbering)) {
            merger.merge_page(&mut base, page_id, overlay_page)?;
        }
    }

    let bytes = document_bytes(&mut base)?;
    output.into().write_pdf(&bytes)?;

    log::info!(
        "Numbered {} pages of {} starting at {}",
        base_pages.len(),
        input.origin(),
        options.start_num
    );

    Ok(next)
}
