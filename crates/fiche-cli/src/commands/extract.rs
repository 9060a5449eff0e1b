use std::path::{Path, PathBuf};

use fiche_core::batch::{run_extraction, ExtractOptions};
use fiche_core::error::FicheError;
use fiche_core::extraction::pdftotext::PdftotextExtractor;
use fiche_core::extraction::Backend;

use crate::output;

pub fn run(
    input: &Path,
    ledger: &Path,
    rule_file: Option<PathBuf>,
    backend: &str,
    filename_vendor: Option<String>,
    output_format: &str,
) -> Result<(), FicheError> {
    let rules = super::vendor_rules(rule_file)?;
    if let Some(tag) = filename_vendor.as_deref() {
        if rules.vendor(tag).is_none() {
            tracing::warn!(vendor = tag, "file name codes use a vendor the rule set does not define");
        }
    }
    let backend = Backend::from_name(backend)?;
    if backend == Backend::Pdftotext && !PdftotextExtractor::is_available() {
        return Err(FicheError::PdftotextNotFound);
    }
    let extractor = backend.build();

    let options = ExtractOptions { filename_vendor };
    let report = run_extraction(input, ledger, extractor.as_ref(), &rules, &options)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_extraction(&report, ledger),
    }
    Ok(())
}
