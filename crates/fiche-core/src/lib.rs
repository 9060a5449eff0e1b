pub mod batch;
pub mod catalog;
pub mod codes;
pub mod dispatch;
pub mod error;
pub mod extraction;
pub mod images;
pub mod inspect;
pub mod ledger;
pub mod model;
pub mod pdf;
pub mod rules;

#[cfg(test)]
mod testing;

use error::FicheError;
use extraction::PdfExtractor;
use model::CodeMatch;
use rules::VendorRules;

/// Main API entry point: pull the identifying codes out of one PDF.
///
/// A document without any recognizable code is not an error; it yields an
/// empty, generic `CodeMatch`. Only decoding failures are returned as `Err`.
pub fn extract_document(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    rules: &VendorRules,
) -> Result<CodeMatch, FicheError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    Ok(codes::extract_codes(&pages, rules))
}
