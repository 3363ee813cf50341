//! Image loading for logos and image stamps

use std::io::{Cursor, Write};
use std::path::Path;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::{Error, Result};

/// Image XObject ready to be added to a PDF
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
    /// "DeviceRGB", "DeviceGray" or "DeviceCMYK"
    pub color_space: &'static str,
    /// "DCTDecode" for passed-through JPEG, "FlateDecode" otherwise
    pub filter: &'static str,
    /// Encoded sample data
    pub data: Vec<u8>,
    /// Flate-encoded alpha channel, drawn as a soft mask
    pub alpha: Option<Vec<u8>>,
    /// CMYK samples are stored inverted (Adobe JPEG)
    pub inverted: bool,
}

impl ImageXObject {
    /// Load a PNG or JPEG file
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::Image {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?;

        Self::from_bytes(&data).map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Decode image bytes
    ///
    /// 8-bit grayscale, RGB and CMYK JPEG data is embedded as-is, with the
    /// colour space taken from the frame header. Everything else is decoded
    /// and re-encoded with FlateDecode, keeping any alpha channel as a
    /// separate soft mask.
    pub fn from_bytes(data: &[u8]) -> image::ImageResult<Self> {
        if let Some(passthrough) = jpeg_header(data).and_then(|header| header.passthrough(data)) {
            return Ok(passthrough);
        }

        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();

        let image = DynamicImage::from_decoder(decoder)?;
        let (samples, color_space, alpha) = if color_type.has_color() {
            let rgba = image.to_rgba8();
            let mut rgb = Vec::with_capacity((width * height * 3) as usize);
            let mut alpha = Vec::with_capacity((width * height) as usize);
            for pixel in rgba.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
                alpha.push(pixel.0[3]);
            }
            (rgb, "DeviceRGB", alpha)
        } else {
            let la = image.to_luma_alpha8();
            let mut gray = Vec::with_capacity((width * height) as usize);
            let mut alpha = Vec::with_capacity((width * height) as usize);
            for pixel in la.pixels() {
                gray.push(pixel.0[0]);
                alpha.push(pixel.0[1]);
            }
            (gray, "DeviceGray", alpha)
        };

        let alpha = if color_type.has_alpha() && alpha.iter().any(|&a| a != u8::MAX) {
            Some(deflate(&alpha)?)
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            color_space,
            filter: "FlateDecode",
            data: deflate(&samples)?,
            alpha,
            inverted: false,
        })
    }

    /// Display height for the given display width, preserving aspect ratio
    pub fn height_for_width(&self, width: f32) -> f32 {
        width * self.height as f32 / self.width as f32
    }

    /// Add the image (and its soft mask) to `doc`, returning the image's id
    pub fn add_to(&self, doc: &mut Document) -> ObjectId {
        let mut dict = image_dictionary(self.width, self.height, self.color_space, self.filter);

        if self.inverted {
            let decode = (0..4).flat_map(|_| [Object::Integer(1), Object::Integer(0)]).collect();
            dict.set("Decode", Object::Array(decode));
        }

        if let Some(ref alpha) = self.alpha {
            let mask = image_dictionary(self.width, self.height, "DeviceGray", "FlateDecode");
            let mask_id = doc.add_object(Stream::new(mask, alpha.clone()).with_compression(false));
            dict.set("SMask", Object::Reference(mask_id));
        }

        doc.add_object(Stream::new(dict, self.data.clone()).with_compression(false))
    }
}

/// Frame information from a JPEG's markers
#[derive(Debug, Clone, Copy, PartialEq)]
struct JpegHeader {
    width: u32,
    height: u32,
    precision: u8,
    components: u8,
    /// An Adobe APP14 segment precedes the frame
    adobe: bool,
}

impl JpegHeader {
    /// Embed the JPEG unchanged if PDF can show its samples directly
    fn passthrough(&self, data: &[u8]) -> Option<ImageXObject> {
        if self.precision != 8 || self.width == 0 || self.height == 0 {
            return None;
        }
        let color_space = match self.components {
            1 => "DeviceGray",
            3 => "DeviceRGB",
            4 => "DeviceCMYK",
            _ => return None,
        };
        Some(ImageXObject {
            width: self.width,
            height: self.height,
            color_space,
            filter: "DCTDecode",
            data: data.to_vec(),
            alpha: None,
            inverted: self.components == 4 && self.adobe,
        })
    }
}

/// Walk the marker segments up to the first start-of-frame
fn jpeg_header(data: &[u8]) -> Option<JpegHeader> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut adobe = false;
    let mut i = 2;
    while i + 4 <= data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        if marker == 0xFF {
            // Fill byte
            i += 1;
            continue;
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            return None;
        }
        let segment = data.get(i + 4..i + 2 + length)?;

        match marker {
            0xEE if segment.starts_with(b"Adobe") => adobe = true,
            // SOF0-SOF15, minus DHT, JPG and DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                if segment.len() < 6 {
                    return None;
                }
                return Some(JpegHeader {
                    precision: segment[0],
                    height: u16::from_be_bytes([segment[1], segment[2]]) as u32,
                    width: u16::from_be_bytes([segment[3], segment[4]]) as u32,
                    components: segment[5],
                    adobe,
                });
            }
            0xDA | 0xD9 => return None,
            _ => {}
        }

        i += 2 + length;
    }

    None
}

fn image_dictionary(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    dict
}

fn deflate(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    encoder.finish()
}
