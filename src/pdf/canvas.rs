//! Procedural drawing surface that produces overlay PDFs
//!
//! A [`Canvas`] records content-stream operators page by page. Each call to
//! [`Canvas::show_page`] closes the current page; [`Canvas::into_document`]
//! assembles every page into a `lopdf::Document` in one go.

use std::collections::{BTreeMap, BTreeSet};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::Result;
use crate::pdf::fonts::{encode_win_ansi, StandardFont, DEFAULT_FONT};
use crate::pdf::image::ImageXObject;
use crate::pdf::io::document_bytes;
use crate::units::PageSize;

const DEFAULT_FONT_SIZE: f32 = 12.0;

#[derive(Debug)]
struct CanvasPage {
    size: PageSize,
    content: Vec<u8>,
    fonts: BTreeSet<StandardFont>,
    images: Vec<usize>,
}

/// Page-by-page drawing surface
#[derive(Debug)]
pub struct Canvas {
    page_size: PageSize,
    font: StandardFont,
    font_size: f32,
    content: Vec<u8>,
    fonts: BTreeSet<StandardFont>,
    page_images: Vec<usize>,
    pages: Vec<CanvasPage>,
    images: Vec<ImageXObject>,
}

impl Canvas {
    /// Start a canvas whose first page has the given size
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            font: DEFAULT_FONT,
            font_size: DEFAULT_FONT_SIZE,
            content: Vec::new(),
            fonts: BTreeSet::new(),
            page_images: Vec::new(),
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Size of the page being drawn, and of the pages that follow it
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
    }

    /// Select the font for subsequent text
    pub fn set_font(&mut self, font: StandardFont, size: f32) {
        self.font = font;
        self.font_size = size;
    }

    /// Number of pages closed so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draw a line of text with its baseline origin at (x, y)
    pub fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        self.fonts.insert(self.font);

        self.content.extend_from_slice(b"BT\n");
        self.content.extend_from_slice(
            format!("/{} {} Tf\n", self.font.resource_name(), self.font_size).as_bytes(),
        );
        self.content.extend_from_slice(format!("{} {} Td\n", x, y).as_bytes());
        self.content.extend_from_slice(&literal_string(&encode_win_ansi(text)));
        self.content.extend_from_slice(b" Tj\nET\n");
    }

    /// Draw a line of text horizontally centred on x
    pub fn draw_centred_string(&mut self, x: f32, y: f32, text: &str) {
        let width = self.font.text_width(text, self.font_size);
        self.draw_string(x - width / 2.0, y, text);
    }

    /// Draw an image with its lower-left corner at (x, y), scaled to width × height
    pub fn draw_image(&mut self, image: &ImageXObject, x: f32, y: f32, width: f32, height: f32) {
        self.images.push(image.clone());
        let index = self.images.len() - 1;
        self.page_images.push(index);

        self.content.extend_from_slice(
            format!("q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n", width, height, x, y, image_name(index))
                .as_bytes(),
        );
    }

    /// Close the current page and start a new one of the same size
    pub fn show_page(&mut self) {
        self.pages.push(CanvasPage {
            size: self.page_size,
            content: std::mem::take(&mut self.content),
            fonts: std::mem::take(&mut self.fonts),
            images: std::mem::take(&mut self.page_images),
        });
    }

    /// Assemble all pages into a PDF document
    ///
    /// A page still being drawn is closed first. A canvas on which nothing
    /// was drawn yields a single blank page.
    pub fn into_document(mut self) -> Document {
        if !self.content.is_empty() || self.pages.is_empty() {
            self.show_page();
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        // One font object per font, shared by every page using it
        let mut font_ids: BTreeMap<StandardFont, ObjectId> = BTreeMap::new();
        for page in &self.pages {
            for font in &page.fonts {
                font_ids
                    .entry(*font)
                    .or_insert_with(|| doc.add_object(Object::Dictionary(font.font_dictionary())));
            }
        }

        let image_ids: Vec<ObjectId> = self.images.iter().map(|image| image.add_to(&mut doc)).collect();

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let mut fonts = Dictionary::new();
            for font in &page.fonts {
                fonts.set(font.resource_name(), Object::Reference(font_ids[font]));
            }

            let mut xobjects = Dictionary::new();
            for &index in &page.images {
                xobjects.set(image_name(index), Object::Reference(image_ids[index]));
            }

            let mut resources = Dictionary::new();
            if !fonts.is_empty() {
                resources.set("Font", Object::Dictionary(fonts));
            }
            if !xobjects.is_empty() {
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let content_id = doc.add_object(Stream::new(Dictionary::new(), page.content));

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name(b"Page".to_vec()));
            page_dict.set("Parent", Object::Reference(pages_id));
            page_dict.set("MediaBox", Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.size.width),
                Object::Real(page.size.height),
            ]));
            page_dict.set("Resources", Object::Dictionary(resources));
            page_dict.set("Contents", Object::Reference(content_id));

            kids.push(Object::Reference(doc.add_object(Object::Dictionary(page_dict))));
        }

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(kids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages_object));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc
    }

    /// Assemble and serialize the canvas as PDF bytes
    pub fn finish(self) -> Result<Vec<u8>> {
        document_bytes(&mut self.into_document())
    }
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

/// Write bytes as a PDF literal string, escaping delimiters
fn literal_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'(');
    for &byte in bytes {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(byte),
        }
    }
    out.push(b')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Content;

    fn number(obj: &Object) -> f32 {
        match obj {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            other => panic!("not a number: {:?}", other),
        }
    }

    fn page_operations(doc: &Document, page_number: u32) -> Vec<(String, Vec<Object>)> {
        let page_id = doc.get_pages()[&page_number];
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| (op.operator, op.operands))
            .collect()
    }

    #[test]
    fn test_literal_string_escapes() {
        assert_eq!(literal_string(b"a(b)c\\"), b"(a\\(b\\)c\\\\)".to_vec());
        assert_eq!(literal_string(&[0x97]), vec![b'(', 0x97, b')']);
    }

    #[test]
    fn test_empty_canvas_is_one_blank_page() {
        let doc = Canvas::new(PageSize::a4()).into_document();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(page_operations(&doc, 1).is_empty());
    }

    #[test]
    fn test_pages_keep_their_own_size() {
        let mut canvas = Canvas::new(PageSize::a4());
        canvas.draw_string(10.0, 10.0, "first");
        canvas.show_page();
        canvas.set_page_size(PageSize::letter());
        canvas.draw_string(10.0, 10.0, "second");
        canvas.show_page();
        assert_eq!(canvas.page_count(), 2);

        // Closed pages only, no trailing blank page
        let doc = canvas.into_document();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let media_box = |n: u32| {
            let page = doc.get_object(pages[&n]).unwrap().as_dict().unwrap();
            page.get(b"MediaBox").unwrap().as_array().unwrap().clone()
        };
        assert!((number(&media_box(1)[3]) - PageSize::a4().height).abs() < 0.001);
        assert!((number(&media_box(2)[2]) - PageSize::letter().width).abs() < 0.001);
    }

    #[test]
    fn test_centred_string_position() {
        let mut canvas = Canvas::new(PageSize::new(200.0, 100.0));
        canvas.set_font(StandardFont::Courier, 10.0);
        // 4 glyphs * 600/1000 * 10pt = 24pt wide
        canvas.draw_centred_string(100.0, 30.0, "abcd");
        let doc = canvas.into_document();

        let ops = page_operations(&doc, 1);
        let td = ops.iter().find(|(op, _)| op == "Td").unwrap();
        assert!((number(&td.1[0]) - 88.0).abs() < 0.001);
        assert!((number(&td.1[1]) - 30.0).abs() < 0.001);

        let tf = ops.iter().find(|(op, _)| op == "Tf").unwrap();
        assert_eq!(tf.1[0].as_name().unwrap(), StandardFont::Courier.resource_name().as_bytes());
    }

    #[test]
    fn test_fonts_are_registered_per_page() {
        let mut canvas = Canvas::new(PageSize::a4());
        canvas.set_font(StandardFont::Helvetica, 9.0);
        canvas.draw_string(0.0, 0.0, "x");
        let doc = canvas.into_document();

        let page_id = doc.get_pages()[&1];
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        let font_ref = fonts
            .get(StandardFont::Helvetica.resource_name().as_bytes())
            .unwrap()
            .as_reference()
            .unwrap();
        let font = doc.get_object(font_ref).unwrap().as_dict().unwrap();
        assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
    }

    #[test]
    fn test_finish_produces_loadable_pdf() {
        let mut canvas = Canvas::new(PageSize::a4());
        canvas.draw_string(72.0, 72.0, "hello");
        let bytes = canvas.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
