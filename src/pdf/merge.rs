//! Compositing overlay pages onto existing pages using lopdf
//!
//! An overlay page is copied into the destination document as a Form
//! XObject carrying its own resources, so its font and image names can never
//! clash with the base page's. The base page's original content is wrapped
//! in q/Q so that any transformation it leaves behind does not move the
//! overlay, and the form is drawn after it.

use std::collections::HashMap;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::Result;
use crate::pdf::metadata::{inherited_attribute, page_box};

/// Copies pages of one overlay document onto pages of another
///
/// Objects shared by several overlay pages (fonts, images) are copied once
/// per merger.
pub struct OverlayMerger<'a> {
    overlay: &'a Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> OverlayMerger<'a> {
    pub fn new(overlay: &'a Document) -> Self {
        Self {
            overlay,
            id_map: HashMap::new(),
        }
    }

    /// Draw `overlay_page` of the overlay document on top of `page_id` in `doc`
    ///
    /// The base page keeps all of its content underneath.
    pub fn merge_page(&mut self, doc: &mut Document, page_id: ObjectId, overlay_page: ObjectId) -> Result<()> {
        let form_id = self.import_page_as_form(doc, overlay_page)?;

        let mut contents = content_references(doc, page_id)?;
        if !contents.is_empty() {
            let save = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            let restore = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
            contents.insert(0, Object::Reference(save));
            contents.push(Object::Reference(restore));
        }

        let name = add_xobject_to_page_resources(doc, page_id, form_id)?;
        let invoke = format!("q\n/{} Do\nQ\n", name);
        let invoke_id = doc.add_object(Stream::new(Dictionary::new(), invoke.into_bytes()));
        contents.push(Object::Reference(invoke_id));

        if let Object::Dictionary(page_dict) = doc.get_object_mut(page_id)? {
            page_dict.set("Contents", Object::Array(contents));
        }

        log::debug!("Merged overlay page {:?} onto page {:?} as /{}", overlay_page, page_id, name);
        Ok(())
    }

    /// Copy an overlay page into `doc` as a Form XObject
    fn import_page_as_form(&mut self, doc: &mut Document, overlay_page: ObjectId) -> Result<ObjectId> {
        let content = page_content(self.overlay, overlay_page)?;

        let resources = inherited_attribute(self.overlay, overlay_page, b"Resources")
            .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));
        let resources = self.import_object(doc, &resources);

        let bbox = page_box(self.overlay, overlay_page);

        let mut form = Dictionary::new();
        form.set("Type", Object::Name(b"XObject".to_vec()));
        form.set("Subtype", Object::Name(b"Form".to_vec()));
        form.set("FormType", Object::Integer(1));
        form.set("BBox", Object::Array(bbox.to_array()));
        form.set("Matrix", Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
        ]));
        form.set("Resources", resources);

        Ok(doc.add_object(Stream::new(form, content)))
    }

    /// Copy an object into `doc`, renumbering every reference it reaches
    fn import_object(&mut self, doc: &mut Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.import_reference(doc, *id)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.import_object(doc, item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(doc, dict)),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.import_dictionary(doc, &stream.dict);
                Object::Stream(copy)
            }
            _ => object.clone(),
        }
    }

    fn import_dictionary(&mut self, doc: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.import_object(doc, value));
        }
        copy
    }

    fn import_reference(&mut self, doc: &mut Document, id: ObjectId) -> ObjectId {
        if let Some(&new_id) = self.id_map.get(&id) {
            return new_id;
        }

        // Register before recursing so reference cycles terminate
        let new_id = doc.new_object_id();
        self.id_map.insert(id, new_id);

        let overlay: &'a Document = self.overlay;
        let copied = match overlay.get_object(id) {
            Ok(object) if !is_page_tree_node(object) => self.import_object(doc, object),
            _ => Object::Null,
        };
        doc.objects.insert(new_id, copied);

        new_id
    }
}

/// Never pull the overlay's page tree into the destination
fn is_page_tree_node(object: &Object) -> bool {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        _ => return false,
    };
    match dict.get(b"Type").and_then(Object::as_name) {
        Ok(name) => name == b"Page" || name == b"Pages",
        Err(_) => false,
    }
}

/// Concatenated, decompressed content of a page
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_object(page_id)?.as_dict()?;

    let streams: Vec<&Object> = match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => items.iter().collect(),
            stream => vec![stream],
        },
        Ok(Object::Array(items)) => items.iter().collect(),
        Ok(other) => vec![other],
        _ => vec![],
    };

    let mut combined = Vec::new();
    for item in streams {
        let stream = match item {
            Object::Reference(id) => doc.get_object(*id)?,
            other => other,
        };
        if let Object::Stream(stream) = stream {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            combined.extend_from_slice(&data);
            combined.push(b'\n');
        }
    }

    Ok(combined)
}

/// The page's content streams as a list of references
fn content_references(doc: &mut Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let contents = doc.get_object(page_id)?.as_dict()?.get(b"Contents").ok().cloned();

    let references = match contents {
        Some(Object::Reference(id)) => match doc.get_object(id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(id)],
        },
        Some(Object::Array(items)) => items,
        Some(Object::Stream(stream)) => vec![Object::Reference(doc.add_object(stream))],
        _ => vec![],
    };

    Ok(references)
}

/// Register an XObject in the page's own Resources under a fresh name
///
/// Inherited resources are copied onto the page first.
fn add_xobject_to_page_resources(doc: &mut Document, page_id: ObjectId, xobject_id: ObjectId) -> Result<String> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(Object::as_dict)
            .map(Clone::clone)
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };

    let mut index = 0;
    let name = loop {
        let candidate = format!("Stamp{}", index);
        if xobjects.get(candidate.as_bytes()).is_err() {
            break candidate;
        }
        index += 1;
    };

    xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    if let Object::Dictionary(page_dict) = doc.get_object_mut(page_id)? {
        page_dict.set("Resources", Object::Dictionary(resources));
    }

    Ok(name)
}
