use crate::error::FicheError;
use crate::extraction::{PageContent, PdfExtractor};

/// Pure-Rust extraction backend built on lopdf's content-stream text decoder.
///
/// Less faithful than pdftotext for CID fonts, but needs no external binary.
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        LopdfExtractor
    }
}

impl Default for LopdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, FicheError> {
        let doc = lopdf::Document::load_mem(pdf_bytes)?;

        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page_num| {
                let text = match doc.extract_text(&[page_num]) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::debug!(page = page_num, "lopdf could not decode page text: {e}");
                        String::new()
                    }
                };
                PageContent::from_text(page_num as usize, &text)
            })
            .collect();

        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "lopdf"
    }
}
