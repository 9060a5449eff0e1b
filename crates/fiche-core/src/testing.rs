//! In-memory PDF fixtures for unit tests.

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

pub fn rgb_image(width: i64, height: i64, pixel: [u8; 3]) -> Stream {
    let data = pixel.repeat((width * height) as usize);
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        data,
    )
}

pub fn gray_image(width: i64, height: i64, level: u8) -> Stream {
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![level; (width * height) as usize],
    );
    // Exercise the Flate path
    let _ = stream.compress();
    stream
}

/// A JPEG-tagged stream whose payload is not a JPEG.
pub fn broken_jpeg() -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 4,
            "Height" => 4,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        b"not a jpeg".to_vec(),
    )
}

/// Build a PDF with one page per entry of `pages`, each listing its images as
/// `/Im1`, `/Im2`, ... The media box sits on the page tree root so pages
/// inherit it.
pub fn build_pdf(pages: Vec<Vec<Stream>>, info: Option<Dictionary>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for images in pages {
        let mut xobjects = Dictionary::new();
        for (i, image) in images.into_iter().enumerate() {
            let image_id = doc.add_object(image);
            xobjects.set(format!("Im{}", i + 1), image_id);
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! { "XObject" => xobjects },
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if let Some(info) = info {
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
