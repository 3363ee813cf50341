//! Integration tests for PDF stamp tools library

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use pdf_stamp_tools::numbering::{format_number, NumberEnclosure};
use pdf_stamp_tools::pdf::fonts::encode_win_ansi;
use pdf_stamp_tools::pdf::{
    count_pages, pdf_info, put_image, put_logo_with_text, put_text, stamp_pdf,
    ImageStamp, LogoTextOptions, PdfSource, StampOptions, TextStamp,
};
use pdf_stamp_tools::units::mm;
use pdf_stamp_tools::{Error, SourceRole};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build a PDF like a word processor would: shared Resources and MediaBox on
/// the page tree, one compressed content stream per page
fn create_test_pdf_with_pages(path: &Path, num_pages: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for index in 0..num_pages {
        let text = format!("BT /F1 24 Tf 72 700 Td (Original page {}) Tj ET", index + 1);
        let mut stream = Stream::new(lopdf::Dictionary::new(), text.into_bytes());
        stream.compress().unwrap();
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => num_pages as i64,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    }));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).expect("Failed to save test PDF");
}

fn create_test_logo(path: &Path) {
    let mut logo = RgbaImage::from_pixel(200, 100, Rgba([0, 80, 160, 255]));
    for x in 0..200 {
        logo.put_pixel(x, 0, Rgba([0, 0, 0, 0]));
    }
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(logo)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("Failed to encode logo");
    std::fs::write(path, buffer.into_inner()).expect("Failed to write logo");
}

fn pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn stream_bytes(doc: &Document, id: ObjectId) -> Vec<u8> {
    let stream = doc.get_object(id).unwrap().as_stream().unwrap();
    stream.decompressed_content().unwrap_or_else(|_| stream.content.clone())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Content drawn by the page itself, excluding any forms it invokes
fn own_content(doc: &Document, page_id: ObjectId) -> Vec<u8> {
    doc.get_page_content(page_id).expect("Failed to read page content")
}

/// Content of every form XObject the page invokes, nested forms included
fn form_content(doc: &Document, page_id: ObjectId) -> Vec<u8> {
    fn collect(doc: &Document, resources: &lopdf::Dictionary, out: &mut Vec<u8>) {
        let xobjects = match resources.get(b"XObject").and_then(Object::as_dict) {
            Ok(dict) => dict,
            Err(_) => return,
        };
        for (_, value) in xobjects.iter() {
            let id = value.as_reference().unwrap();
            let stream = doc.get_object(id).unwrap().as_stream().unwrap();
            if stream.dict.get(b"Subtype").and_then(Object::as_name).ok() != Some(b"Form".as_slice()) {
                continue;
            }
            out.extend(stream_bytes(doc, id));
            if let Ok(inner) = stream.dict.get(b"Resources").and_then(Object::as_dict) {
                collect(doc, inner, out);
            }
        }
    }

    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let mut out = Vec::new();
    if let Ok(resources) = page.get(b"Resources").and_then(Object::as_dict) {
        collect(doc, resources, &mut out);
    }
    out
}

#[test]
fn test_stamp_numbers_every_page() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("input.pdf");
    let output = temp_dir.path().join("output.pdf");
    create_test_pdf_with_pages(&input, 3);

    let next = stamp_pdf(input.as_path(), output.as_path(), &StampOptions::default())
        .expect("Failed to stamp PDF");
    assert_eq!(next, 4);

    let doc = Document::load(&output).expect("Failed to load stamped PDF");
    let page_ids = pages(&doc);
    assert_eq!(page_ids.len(), 3);

    for (index, &page_id) in page_ids.iter().enumerate() {
        let original = format!("(Original page {}) Tj", index + 1);
        assert!(contains(&own_content(&doc, page_id), original.as_bytes()));

        let number = encode_win_ansi(&format_number(index as u32 + 1, NumberEnclosure::EmDash));
        assert!(contains(&form_content(&doc, page_id), &number));
    }
}

#[test]
fn test_pages_differ_only_by_number_without_header() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("input.pdf");
    create_test_pdf_with_pages(&input, 2);

    let mut output = Vec::new();
    let options = StampOptions {
        enclosure: NumberEnclosure::Page,
        ..Default::default()
    };
    stamp_pdf(input.as_path(), &mut output, &options).unwrap();

    let doc = Document::load_mem(&output).unwrap();
    let page_ids = pages(&doc);
    let first = String::from_utf8_lossy(&form_content(&doc, page_ids[0])).replace("p.1", "p.N");
    let second = String::from_utf8_lossy(&form_content(&doc, page_ids[1])).replace("p.2", "p.N");
    assert_eq!(first, second);
}

#[test]
fn test_header_overlay_on_first_page_only() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("input.pdf");
    let logo = temp_dir.path().join("logo.png");
    let header = temp_dir.path().join("header.pdf");
    create_test_pdf_with_pages(&input, 3);
    create_test_logo(&logo);

    let header_options = LogoTextOptions {
        text_lines: vec!["Bridge Club".to_string(), "Lesson 4".to_string()],
        logo_file: Some(logo),
        ..Default::default()
    };
    put_logo_with_text(header.as_path(), &header_options).expect("Failed to create header");

    let mut output = Vec::new();
    let options = StampOptions {
        first_page_overlay: Some(PdfSource::from(header)),
        ..Default::default()
    };
    let next = stamp_pdf(input.as_path(), &mut output, &options).unwrap();
    assert_eq!(next, 4);

    let doc = Document::load_mem(&output).unwrap();
    let page_ids = pages(&doc);
    assert!(contains(&form_content(&doc, page_ids[0]), b"(Bridge Club) Tj"));
    for &page_id in &page_ids[1..] {
        assert!(!contains(&form_content(&doc, page_id), b"(Bridge Club) Tj"));
    }
}

#[test]
fn test_continuous_numbering_across_documents() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("1.pdf");
    let second = temp_dir.path().join("2.pdf");
    create_test_pdf_with_pages(&first, 2);
    create_test_pdf_with_pages(&second, 3);

    let mut options = StampOptions {
        enclosure: NumberEnclosure::Parens,
        ..Default::default()
    };
    let mut stamped: Vec<PathBuf> = Vec::new();
    for input in [&first, &second] {
        let output = temp_dir.path().join(format!("stamped-{}", input.file_name().unwrap().to_string_lossy()));
        options.start_num = stamp_pdf(input.as_path(), output.as_path(), &options).unwrap();
        stamped.push(output);
    }
    assert_eq!(options.start_num, 6);

    let doc = Document::load(&stamped[1]).unwrap();
    let last = *pages(&doc).last().unwrap();
    assert!(contains(&form_content(&doc, last), b"(\\(5\\)) Tj"));
}

#[test]
fn test_missing_input_creates_no_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("output.pdf");

    let err = stamp_pdf(temp_dir.path().join("missing.pdf"), output.as_path(), &StampOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::NotFound { role: SourceRole::Base, .. }));
    assert!(err.to_string().contains("missing.pdf"));
    assert!(!output.exists());
}

#[test]
fn test_malformed_input() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("broken.pdf");
    std::fs::write(&input, b"this is not a pdf").unwrap();

    let mut output = Vec::new();
    let err = stamp_pdf(input.as_path(), &mut output, &StampOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Malformed { role: SourceRole::Base, .. }));
    assert!(output.is_empty());
}

#[test]
fn test_blank_header_is_valid_pdf() {
    let temp_dir = TempDir::new().unwrap();
    let header = temp_dir.path().join("header.pdf");

    put_logo_with_text(header.as_path(), &LogoTextOptions::default()).unwrap();

    let info = pdf_info(&PdfSource::from(header.as_path())).unwrap();
    assert_eq!(info.page_count, 1);
    assert!((info.page_boxes[0].width() - mm(210.0)).abs() < 0.01);
    assert!((info.page_boxes[0].height() - mm(297.0)).abs() < 0.01);
}

#[test]
fn test_put_image_keeps_every_page() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("target.pdf");
    let logo = temp_dir.path().join("logo.png");
    create_test_pdf_with_pages(&target, 3);
    create_test_logo(&logo);

    let stamp = ImageStamp {
        img_file: logo,
        img_width: mm(40.0),
        x: mm(10.0),
        y: mm(250.0),
    };
    put_image(target.as_path(), &stamp).expect("Failed to put image");

    assert_eq!(count_pages(&PdfSource::from(target.as_path())).unwrap(), 3);

    let doc = Document::load(&target).unwrap();
    let page_ids = pages(&doc);
    let drawn = form_content(&doc, page_ids[0]);
    assert!(contains(&drawn, format!("q\n{} 0 0 ", mm(40.0)).as_bytes()));
    assert!(contains(&drawn, format!(" {} {} cm", mm(10.0), mm(250.0)).as_bytes()));
    assert!(contains(&own_content(&doc, page_ids[2]), b"(Original page 3) Tj"));
}

#[test]
fn test_put_text_on_buffer() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("source.pdf");
    create_test_pdf_with_pages(&source, 2);
    let mut buffer = std::fs::read(&source).unwrap();

    let stamp = TextStamp {
        text_lines: vec!["Room 12".to_string(), "Tuesday".to_string()],
        x: mm(150.0),
        y: mm(20.0),
        ..Default::default()
    };
    put_text(&mut buffer, &stamp).unwrap();

    let doc = Document::load_mem(&buffer).unwrap();
    let page_ids = pages(&doc);
    assert_eq!(page_ids.len(), 2);
    let text = form_content(&doc, page_ids[0]);
    assert!(contains(&text, b"(Room 12) Tj"));
    assert!(contains(&text, b"(Tuesday) Tj"));
    assert!(!contains(&form_content(&doc, page_ids[1]), b"(Room 12) Tj"));
}

#[test]
fn test_put_text_missing_target() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("absent.pdf");

    let err = put_text(target.as_path(), &TextStamp::default()).unwrap_err();
    assert_eq!(err.role(), Some(SourceRole::Target));
    assert!(!target.exists());
}
