//! Embedded image extraction: every image XObject referenced by a page is
//! re-encoded as PNG under `<stem>-<n>.png`.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Document, Object, Stream};
use serde::{Deserialize, Serialize};

use crate::error::FicheError;
use crate::pdf;

/// An image that was found but could not be written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageFailure {
    pub page: u32,
    pub name: String,
    pub reason: String,
}

/// Images written for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageExtraction {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ImageFailure>,
}

/// Extract the images of one PDF into `out_dir`.
///
/// Pages are visited in order and images within a page in resource order.
/// The numbering only advances on a successful write, so the output is
/// `<stem>-1.png .. <stem>-N.png` without gaps. An image referenced from
/// several pages is written once per reference.
pub fn extract_images(
    pdf_bytes: &[u8],
    stem: &str,
    out_dir: &Path,
) -> Result<ImageExtraction, FicheError> {
    let doc = Document::load_mem(pdf_bytes)?;
    let mut result = ImageExtraction::default();

    for (page_number, page_id) in doc.get_pages() {
        for (name, object_id, stream) in pdf::page_images(&doc, page_id) {
            let written = decode_image(&doc, stream).and_then(|img| {
                let path = out_dir.join(format!("{stem}-{}.png", result.written.len() + 1));
                img.save_with_format(&path, ImageFormat::Png)
                    .map_err(|e| FicheError::ImageDecode(e.to_string()))?;
                Ok(path)
            });

            match written {
                Ok(path) => {
                    tracing::debug!(page = page_number, image = %name, path = %path.display(), "image written");
                    result.written.push(path);
                }
                Err(e) => {
                    tracing::warn!(
                        page = page_number,
                        image = %name,
                        object = ?object_id,
                        error = %e,
                        "image skipped"
                    );
                    result.failures.push(ImageFailure {
                        page: page_number,
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(result)
}

/// Number of image XObjects per page, in page order.
pub fn count_images(doc: &Document) -> Vec<(u32, usize)> {
    doc.get_pages()
        .into_iter()
        .map(|(number, id)| (number, pdf::page_images(doc, id).len()))
        .collect()
}

fn decode_image(doc: &Document, stream: &Stream) -> Result<DynamicImage, FicheError> {
    let filters = pdf::filter_names(doc, stream);

    if let Some(unsupported) = filters
        .iter()
        .find(|f| matches!(f.as_str(), "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode"))
    {
        return Err(FicheError::ImageDecode(format!("unsupported filter {unsupported}")));
    }

    if filters.last().map(String::as_str) == Some("DCTDecode") {
        let jpeg = if filters.len() == 1 {
            stream.content.clone()
        } else {
            stream.decompressed_content()?
        };
        return image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
            .map_err(|e| FicheError::ImageDecode(e.to_string()));
    }

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream.decompressed_content()?
    };
    decode_raw(doc, stream, data)
}

fn decode_raw(doc: &Document, stream: &Stream, data: Vec<u8>) -> Result<DynamicImage, FicheError> {
    let dict = &stream.dict;
    let dimension = |key: &[u8]| -> Result<u32, FicheError> {
        dict.get(key)
            .ok()
            .and_then(|v| pdf::resolve(doc, v))
            .and_then(pdf::number)
            .filter(|n| *n > 0.0)
            .map(|n| n as u32)
            .ok_or_else(|| {
                FicheError::ImageDecode(format!("missing {}", String::from_utf8_lossy(key)))
            })
    };
    let width = dimension(b"Width")?;
    let height = dimension(b"Height")?;

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|v| pdf::resolve(doc, v))
        .and_then(pdf::number)
        .unwrap_or(8.0) as u32;
    if bits != 8 {
        return Err(FicheError::ImageDecode(format!(
            "{bits} bits per component not supported"
        )));
    }

    let components = color_components(doc, dict.get(b"ColorSpace").ok())?;
    let needed = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(components))
        .ok_or_else(|| FicheError::ImageDecode("image dimensions too large".to_string()))?;
    if data.len() < needed {
        return Err(FicheError::ImageDecode(format!(
            "image data too short: {} bytes for {width}x{height}x{components}",
            data.len()
        )));
    }
    let mut data = data;
    data.truncate(needed);

    let too_short = || FicheError::ImageDecode("image buffer size mismatch".to_string());
    match components {
        1 => GrayImage::from_raw(width, height, data)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(too_short),
        3 => RgbImage::from_raw(width, height, data)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(too_short),
        4 => RgbImage::from_raw(width, height, cmyk_to_rgb(&data))
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(too_short),
        n => Err(FicheError::ImageDecode(format!("{n} color components not supported"))),
    }
}

/// Components per pixel for the colour spaces we can rebuild.
fn color_components(doc: &Document, space: Option<&Object>) -> Result<usize, FicheError> {
    let Some(space) = space.and_then(|s| pdf::resolve(doc, s)) else {
        return Err(FicheError::ImageDecode("missing ColorSpace".to_string()));
    };

    match space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => Ok(1),
            b"DeviceRGB" | b"CalRGB" => Ok(3),
            b"DeviceCMYK" => Ok(4),
            other => Err(FicheError::ImageDecode(format!(
                "color space {} not supported",
                String::from_utf8_lossy(other)
            ))),
        },
        Object::Array(items) => {
            let family = items.first().and_then(|f| pdf::resolve(doc, f));
            match family {
                Some(Object::Name(n)) if n.as_slice() == b"ICCBased" => items
                    .get(1)
                    .and_then(|p| pdf::resolve_dict(doc, p))
                    .and_then(|d| d.get(b"N").ok())
                    .and_then(pdf::number)
                    .map(|n| n as usize)
                    .ok_or_else(|| FicheError::ImageDecode("ICCBased without N".to_string())),
                Some(Object::Name(n)) if matches!(n.as_slice(), b"CalGray" | b"CalRGB") => {
                    Ok(if n.as_slice() == b"CalGray" { 1 } else { 3 })
                }
                Some(Object::Name(n)) => Err(FicheError::ImageDecode(format!(
                    "color space {} not supported",
                    String::from_utf8_lossy(n)
                ))),
                _ => Err(FicheError::ImageDecode("malformed ColorSpace".to_string())),
            }
        }
        _ => Err(FicheError::ImageDecode("malformed ColorSpace".to_string())),
    }
}

fn cmyk_to_rgb(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - px[3] as u16;
            let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
            [channel(px[0]), channel(px[1]), channel(px[2])]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{broken_jpeg, build_pdf, gray_image, rgb_image};
    use tempfile::TempDir;
    use lopdf::dictionary;

    #[test]
    fn test_images_numbered_across_pages() {
        let dir = TempDir::new().unwrap();
        let bytes = build_pdf(
            vec![
                vec![rgb_image(2, 2, [255, 0, 0])],
                vec![gray_image(3, 1, 128), rgb_image(1, 1, [0, 0, 255])],
            ],
            None,
        );

        let result = extract_images(&bytes, "R1001", dir.path()).unwrap();
        assert_eq!(result.written.len(), 3);
        assert!(result.failures.is_empty());

        let first = image::open(dir.path().join("R1001-1.png")).unwrap().to_rgb8();
        assert_eq!(first.dimensions(), (2, 2));
        assert_eq!(first.get_pixel(0, 0).0, [255, 0, 0]);

        let second = image::open(dir.path().join("R1001-2.png")).unwrap().to_luma8();
        assert_eq!(second.dimensions(), (3, 1));
        assert_eq!(second.get_pixel(2, 0).0, [128]);

        assert!(dir.path().join("R1001-3.png").exists());
    }

    #[test]
    fn test_failed_image_does_not_consume_a_number() {
        let dir = TempDir::new().unwrap();
        let bytes = build_pdf(
            vec![vec![broken_jpeg(), rgb_image(1, 1, [0, 255, 0])]],
            None,
        );

        let result = extract_images(&bytes, "R2002", dir.path()).unwrap();
        assert_eq!(result.written.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "Im1");
        assert!(dir.path().join("R2002-1.png").exists());
        assert!(!dir.path().join("R2002-2.png").exists());
    }

    #[test]
    fn test_oversized_dimensions_are_skipped() {
        let dir = TempDir::new().unwrap();
        let huge = Stream::new(
            lopdf::dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 4294967295i64,
                "Height" => 4294967295i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            vec![0; 12],
        );
        let bytes = build_pdf(vec![vec![huge, rgb_image(1, 1, [0, 0, 0])]], None);

        let result = extract_images(&bytes, "R5005", dir.path()).unwrap();
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].name, "Im1");
        assert!(result.failures[0].reason.contains("too large"));
        assert_eq!(result.written.len(), 1);
        assert!(dir.path().join("R5005-1.png").exists());
    }

    #[test]
    fn test_document_without_images() {
        let dir = TempDir::new().unwrap();
        let bytes = build_pdf(vec![vec![], vec![]], None);
        let result = extract_images(&bytes, "R3003", dir.path()).unwrap();
        assert!(result.written.is_empty());
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_unparseable_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = extract_images(b"%PDF-garbage", "R4004", dir.path()).unwrap_err();
        assert!(matches!(err, FicheError::PdfParse(_)));
    }

    #[test]
    fn test_count_images() {
        let bytes = build_pdf(vec![vec![rgb_image(1, 1, [0, 0, 0])], vec![]], None);
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(count_images(&doc), vec![(1, 1), (2, 0)]);
    }

    #[test]
    fn test_cmyk_conversion() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), vec![255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), vec![0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 0, 0]), vec![0, 255, 255]);
    }
}
