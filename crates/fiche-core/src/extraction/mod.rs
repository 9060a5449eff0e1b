pub mod lopdf_text;
pub mod pdftotext;

use crate::error::FicheError;

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

impl PageContent {
    /// Build a page from a raw text blob, splitting on line breaks.
    pub fn from_text(page_number: usize, text: &str) -> Self {
        PageContent {
            page_number,
            lines: text.lines().map(|l| l.to_string()).collect(),
        }
    }

    /// The page text with its lines re-joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, FicheError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Text backends selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Pdftotext,
    Lopdf,
}

impl Backend {
    pub fn from_name(name: &str) -> Result<Backend, FicheError> {
        match name.trim().to_lowercase().as_str() {
            "pdftotext" | "poppler" => Ok(Backend::Pdftotext),
            "lopdf" => Ok(Backend::Lopdf),
            other => Err(FicheError::Extraction(format!(
                "unknown text backend '{other}'. Available: pdftotext, lopdf"
            ))),
        }
    }

    pub fn build(self) -> Box<dyn PdfExtractor> {
        match self {
            Backend::Pdftotext => Box::new(pdftotext::PdftotextExtractor::new()),
            Backend::Lopdf => Box::new(lopdf_text::LopdfExtractor::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_text_roundtrips_lines() {
        let page = PageContent::from_text(1, "FICHE TECHNIQUE\n3760123456789\n");
        assert_eq!(page.lines.len(), 2);
        assert_eq!(page.text(), "FICHE TECHNIQUE\n3760123456789");
    }

    #[test]
    fn test_backend_from_name() {
        assert_eq!(Backend::from_name("lopdf").unwrap(), Backend::Lopdf);
        assert_eq!(Backend::from_name(" Pdftotext ").unwrap(), Backend::Pdftotext);
        assert!(Backend::from_name("ocr").is_err());
    }

    #[test]
    fn test_backend_build_names() {
        assert_eq!(Backend::Lopdf.build().backend_name(), "lopdf");
        assert_eq!(Backend::Pdftotext.build().backend_name(), "pdftotext");
    }
}
