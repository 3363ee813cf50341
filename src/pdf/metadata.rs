//! Page geometry and document information

use lopdf::{Document, Object, ObjectId};
use crate::error::{Error, Result, SourceRole};
use crate::pdf::io::PdfSource;
use crate::units::PageSize;

/// Page trees deeper than this are treated as broken
const MAX_TREE_DEPTH: usize = 32;

/// A page's MediaBox in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl PageBox {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn size(&self) -> PageSize {
        PageSize::new(self.width(), self.height())
    }

    /// Box as a PDF rectangle array
    pub fn to_array(&self) -> Vec<Object> {
        vec![
            Object::Real(self.left),
            Object::Real(self.bottom),
            Object::Real(self.right),
            Object::Real(self.top),
        ]
    }

    fn from_array(items: &[Object]) -> Option<Self> {
        if items.len() != 4 {
            return None;
        }
        let mut values = [0.0f32; 4];
        for (value, item) in values.iter_mut().zip(items) {
            *value = match item {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r,
                _ => return None,
            };
        }
        Some(Self {
            left: values[0].min(values[2]),
            bottom: values[1].min(values[3]),
            right: values[0].max(values[2]),
            top: values[1].max(values[3]),
        })
    }
}

impl From<PageSize> for PageBox {
    fn from(size: PageSize) -> Self {
        Self {
            left: 0.0,
            bottom: 0.0,
            right: size.width,
            top: size.height,
        }
    }
}

/// Look up a page attribute, following the Parent chain for inherited ones
///
/// A top-level indirect value is dereferenced.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(current_id).ok()?.as_dict().ok()?;

        if let Ok(value) = dict.get(key) {
            return match value {
                Object::Reference(id) => doc.get_object(*id).ok().cloned(),
                other => Some(other.clone()),
            };
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current_id = *parent_id,
            _ => return None,
        }
    }

    None
}

/// The page's MediaBox; A4 is assumed when none can be found
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok().and_then(|items| PageBox::from_array(items)));

    match media_box {
        Some(media_box) => media_box,
        None => {
            log::warn!("Page {:?} has no usable MediaBox, assuming A4", page_id);
            PageBox::from(PageSize::a4())
        }
    }
}

/// Page ids in page order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// PDF information
#[derive(Debug, Clone)]
pub struct PdfInfo {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// MediaBox of every page, in page order
    pub page_boxes: Vec<PageBox>,
    /// Document title (if present)
    pub title: Option<String>,
}

/// Read page count, page sizes and title of a PDF
pub fn pdf_info(source: &PdfSource) -> Result<PdfInfo> {
    let doc = source.load(SourceRole::Base)?;

    let page_boxes: Vec<PageBox> = page_ids(&doc)
        .into_iter()
        .map(|id| page_box(&doc, id))
        .collect();

    Ok(PdfInfo {
        page_count: page_boxes.len(),
        page_boxes,
        title: document_title(&doc),
    })
}

/// Count the pages of a PDF
pub fn count_pages(source: &PdfSource) -> Result<usize> {
    let doc = source.load(SourceRole::Base)?;
    let count = doc.get_pages().len();

    if count == 0 {
        return Err(Error::NoPages {
            role: SourceRole::Base,
            origin: source.origin(),
        });
    }

    Ok(count)
}

fn document_title(doc: &Document) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let title = info.as_dict().ok()?.get(b"Title").ok()?.as_str().ok()?;
    String::from_utf8(title.to_vec()).ok()
}
