//! Diagnostic dump of a PDF's structure: metadata, page sizes, text preview
//! and image counts.

use std::path::Path;

use lopdf::{Document, Object};
use serde::Serialize;

use crate::error::FicheError;
use crate::extraction::PdfExtractor;
use crate::{images, pdf};

/// Characters of page text kept in a preview.
pub const PREVIEW_LIMIT: usize = 100_000;

#[derive(Debug, Clone, Serialize)]
pub struct MetadataField {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageStructure {
    pub number: u32,
    /// Media box size in points.
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// `None` when the page has no extractable text.
    pub text_preview: Option<String>,
    pub image_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentStructure {
    pub file_name: String,
    pub version: String,
    pub page_count: usize,
    pub metadata: Vec<MetadataField>,
    pub pages: Vec<PageStructure>,
}

/// Inspect a PDF on disk.
pub fn inspect_file(
    path: &Path,
    extractor: &dyn PdfExtractor,
) -> Result<DocumentStructure, FicheError> {
    if !path.is_file() {
        return Err(FicheError::MissingInput {
            what: "PDF file",
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    inspect_bytes(&file_name, &bytes, extractor)
}

/// Inspect PDF bytes. Text comes from `extractor`; a text failure leaves the
/// previews empty rather than failing the dump.
pub fn inspect_bytes(
    file_name: &str,
    bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<DocumentStructure, FicheError> {
    let doc = Document::load_mem(bytes)?;

    let texts: Vec<String> = match extractor.extract_pages(bytes) {
        Ok(pages) => pages.into_iter().map(|p| p.text()).collect(),
        Err(e) => {
            tracing::warn!(file = file_name, backend = extractor.backend_name(), error = %e, "no text for preview");
            Vec::new()
        }
    };
    let image_counts = images::count_images(&doc);

    let pages = doc
        .get_pages()
        .into_iter()
        .enumerate()
        .map(|(idx, (number, page_id))| {
            let (width, height) = media_box(&doc, page_id);
            let text_preview = texts
                .get(idx)
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(preview);
            let image_count = image_counts
                .iter()
                .find(|(n, _)| *n == number)
                .map_or(0, |(_, c)| *c);
            PageStructure {
                number,
                width,
                height,
                text_preview,
                image_count,
            }
        })
        .collect::<Vec<_>>();

    Ok(DocumentStructure {
        file_name: file_name.to_string(),
        version: doc.version.clone(),
        page_count: pages.len(),
        metadata: metadata(&doc),
        pages,
    })
}

fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> (Option<f64>, Option<f64>) {
    let Some(Object::Array(rect)) = pdf::inherited(doc, page_id, b"MediaBox") else {
        return (None, None);
    };
    let coords: Vec<f64> = rect
        .iter()
        .filter_map(|v| pdf::resolve(doc, v).and_then(pdf::number))
        .collect();
    match coords.as_slice() {
        [x0, y0, x1, y1] => (Some((x1 - x0).abs()), Some((y1 - y0).abs())),
        _ => (None, None),
    }
}

fn metadata(doc: &Document) -> Vec<MetadataField> {
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|i| pdf::resolve_dict(doc, i))
    else {
        return Vec::new();
    };

    info.iter()
        .filter_map(|(key, value)| {
            let value = match pdf::resolve(doc, value)? {
                Object::String(bytes, _) => pdf::decode_text_string(bytes),
                Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
                Object::Boolean(b) => b.to_string(),
                other => pdf::number(other)?.to_string(),
            };
            let value = value.trim().to_string();
            (!value.is_empty()).then(|| MetadataField {
                key: String::from_utf8_lossy(key).into_owned(),
                value,
            })
        })
        .collect()
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
