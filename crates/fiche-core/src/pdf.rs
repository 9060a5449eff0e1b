//! Small helpers over lopdf's object model shared by the image extractor and
//! the structure inspector.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Follow a reference (one level) to the object it points at.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys
/// (`Resources`, `MediaBox`, ...).
pub fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    // Page trees are shallow; the bound only guards against Parent cycles
    for _ in 0..32 {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        dict = resolve_dict(doc, dict.get(b"Parent").ok()?)?;
    }
    None
}

/// Numeric value of an integer or real object.
pub fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Filter names of a stream, in application order.
pub fn filter_names(doc: &Document, stream: &Stream) -> Vec<String> {
    let Some(filter) = stream.dict.get(b"Filter").ok().and_then(|f| resolve(doc, f)) else {
        return Vec::new();
    };
    match filter {
        Object::Name(name) => vec![String::from_utf8_lossy(name).into_owned()],
        Object::Array(items) => items
            .iter()
            .filter_map(|item| match resolve(doc, item)? {
                Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Image XObjects listed in a page's resources, in resource-name order.
pub fn page_images(doc: &Document, page_id: ObjectId) -> Vec<(String, ObjectId, &Stream)> {
    let Some(resources) = inherited(doc, page_id, b"Resources").and_then(|r| match r {
        Object::Dictionary(d) => Some(d),
        _ => None,
    }) else {
        return Vec::new();
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|x| resolve_dict(doc, x))
    else {
        return Vec::new();
    };

    let mut images: Vec<(String, ObjectId, &Stream)> = xobjects
        .iter()
        .filter_map(|(name, obj)| {
            let Object::Reference(id) = obj else {
                return None;
            };
            let Ok(Object::Stream(stream)) = doc.get_object(*id) else {
                return None;
            };
            let is_image = matches!(
                stream.dict.get(b"Subtype").ok().and_then(|s| resolve(doc, s)),
                Some(Object::Name(n)) if n.as_slice() == b"Image"
            );
            is_image.then(|| (String::from_utf8_lossy(name).into_owned(), *id, stream))
        })
        .collect();
    images.sort_by(|a, b| a.0.cmp(&b.0));
    images
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise byte-per-char).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_string_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, b'F', 0x00, 0xE9];
        assert_eq!(decode_text_string(&bytes), "Fé");
    }

    #[test]
    fn test_decode_text_string_latin1() {
        assert_eq!(decode_text_string(b"Fiche"), "Fiche");
        assert_eq!(decode_text_string(&[b'F', 0xE9]), "Fé");
    }

    #[test]
    fn test_number() {
        assert_eq!(number(&Object::Integer(595)), Some(595.0));
        assert_eq!(number(&Object::Real(841.5)), Some(841.5));
        assert_eq!(number(&Object::Null), None);
    }
}
