//! Directory-level drivers for the three pipeline phases.
//!
//! Missing inputs are fatal and returned as errors before any work is done.
//! Anything that goes wrong with a single document, code or destination is
//! logged, counted in the summary and the run continues.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::catalog::{CatalogLayout, ProductCatalog};
use crate::codes::filename::code_from_filename;
use crate::dispatch::{RenameDispatcher, RenameReport};
use crate::error::FicheError;
use crate::extraction::PdfExtractor;
use crate::images::extract_images;
use crate::ledger::{read_ledger, LedgerWriter};
use crate::model::{CodeMatch, CodeSource, LedgerEntry};
use crate::rules::VendorRules;

/// Knobs for the extraction phase.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// When set, `12345.pdf` / `123456.pdf` are recorded under this vendor
    /// with the file name as their code, without being read.
    pub filename_vendor: Option<String>,
}

/// Extraction result for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentCodes {
    pub filename: String,
    pub codes: Vec<String>,
    pub vendor: String,
    pub source: CodeSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionSummary {
    pub documents: usize,
    pub with_codes: usize,
    pub without_codes: usize,
    pub from_filename: usize,
    /// Documents that could not be read or decoded.
    pub failures: usize,
    /// Documents with codes, per vendor tag (`EAN` for plain barcodes).
    pub by_vendor: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub summary: ExtractionSummary,
    pub documents: Vec<DocumentCodes>,
}

/// Images written for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentImages {
    pub filename: String,
    pub images_written: usize,
    pub image_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageSummary {
    pub documents: usize,
    pub images_written: usize,
    pub image_failures: usize,
    pub documents_without_images: usize,
    /// Documents that could not be opened at all.
    pub failures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub summary: ImageSummary,
    pub documents: Vec<DocumentImages>,
}

/// Extract codes from every PDF in `input_dir` and write one ledger row per
/// document, in file name order.
pub fn run_extraction(
    input_dir: &Path,
    ledger_path: &Path,
    extractor: &dyn PdfExtractor,
    rules: &VendorRules,
    options: &ExtractOptions,
) -> Result<ExtractionReport, FicheError> {
    require_dir(input_dir, "input directory")?;
    let files = list_pdfs(input_dir, "")?;
    tracing::info!(
        documents = files.len(),
        backend = extractor.backend_name(),
        rules = %rules.name,
        "extracting codes from {}",
        input_dir.display()
    );

    let mut ledger = LedgerWriter::create(ledger_path)?;
    let mut summary = ExtractionSummary::default();
    let mut documents = Vec::with_capacity(files.len());

    for filename in files {
        let shortcut = options
            .filename_vendor
            .as_deref()
            .and_then(|vendor| code_from_filename(&filename, vendor));

        let (found, source, error) = match shortcut {
            Some(found) => (found, CodeSource::Filename, None),
            None => match read_and_extract(&input_dir.join(&filename), extractor, rules) {
                Ok(found) => (found, CodeSource::Content, None),
                Err(e) => {
                    tracing::warn!(file = %filename, error = %e, "could not extract codes");
                    (CodeMatch::default(), CodeSource::Failed, Some(e.to_string()))
                }
            },
        };

        summary.documents += 1;
        match source {
            CodeSource::Failed => summary.failures += 1,
            CodeSource::Filename => summary.from_filename += 1,
            CodeSource::Content => {}
        }
        if found.codes.is_empty() {
            summary.without_codes += 1;
            tracing::debug!(file = %filename, "no codes found");
        } else {
            summary.with_codes += 1;
            *summary.by_vendor.entry(found.vendor.to_string()).or_default() += 1;
            tracing::debug!(file = %filename, vendor = %found.vendor, codes = ?found.codes, "codes found");
        }

        let entry = LedgerEntry::new(filename, found);
        ledger.write(&entry)?;
        documents.push(DocumentCodes {
            filename: entry.filename,
            vendor: entry.vendor.as_ledger().to_string(),
            codes: entry.codes,
            source,
            error,
        });
    }
    ledger.finish()?;

    tracing::info!(
        documents = summary.documents,
        with_codes = summary.with_codes,
        failures = summary.failures,
        "ledger written to {}",
        ledger_path.display()
    );
    Ok(ExtractionReport { summary, documents })
}

/// Place every ledger row's document under its product names.
pub fn run_rename(
    ledger_path: &Path,
    catalog_path: &Path,
    layout: &CatalogLayout,
    rules: &VendorRules,
    input_dir: &Path,
    dest_dir: &Path,
) -> Result<RenameReport, FicheError> {
    require_file(ledger_path, "ledger")?;
    require_file(catalog_path, "product catalog")?;
    require_dir(input_dir, "input directory")?;

    let catalog = ProductCatalog::load(catalog_path, layout, rules)?;
    let entries = read_ledger(ledger_path)?;

    if !dest_dir.is_dir() {
        std::fs::create_dir_all(dest_dir)?;
        tracing::info!("created destination directory {}", dest_dir.display());
    }

    let dispatcher = RenameDispatcher::new(&catalog, input_dir, dest_dir);
    let (summary, placements) = dispatcher.dispatch_all(&entries);

    tracing::info!(
        rows = summary.rows,
        placed = summary.placed,
        destinations = summary.destinations_created,
        failures = summary.destination_failures,
        "rename finished"
    );
    Ok(RenameReport {
        summary,
        placements,
        catalog_collisions: catalog.collisions().to_vec(),
    })
}

/// Extract embedded images from the PDFs of `input_dir` whose name starts
/// with `prefix` (case-insensitive, empty matches all).
pub fn run_images(input_dir: &Path, out_dir: &Path, prefix: &str) -> Result<ImageReport, FicheError> {
    require_dir(input_dir, "input directory")?;
    std::fs::create_dir_all(out_dir)?;
    let files = list_pdfs(input_dir, prefix)?;
    tracing::info!(
        documents = files.len(),
        prefix,
        "extracting images to {}",
        out_dir.display()
    );

    let mut summary = ImageSummary::default();
    let mut documents = Vec::with_capacity(files.len());

    for filename in files {
        summary.documents += 1;
        let path = input_dir.join(&filename);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.clone());

        let result = std::fs::read(&path)
            .map_err(FicheError::from)
            .and_then(|bytes| extract_images(&bytes, &stem, out_dir));

        let document = match result {
            Ok(extraction) => {
                let written = extraction.written.len();
                summary.images_written += written;
                summary.image_failures += extraction.failures.len();
                if written == 0 {
                    summary.documents_without_images += 1;
                    tracing::info!(file = %filename, "no images found");
                } else {
                    tracing::info!(file = %filename, images = written, "images extracted");
                }
                DocumentImages {
                    filename,
                    images_written: written,
                    image_failures: extraction.failures.len(),
                    error: None,
                }
            }
            Err(e) => {
                summary.failures += 1;
                tracing::warn!(file = %filename, error = %e, "could not extract images");
                DocumentImages {
                    filename,
                    images_written: 0,
                    image_failures: 0,
                    error: Some(e.to_string()),
                }
            }
        };
        documents.push(document);
    }

    Ok(ImageReport { summary, documents })
}

fn read_and_extract(
    path: &Path,
    extractor: &dyn PdfExtractor,
    rules: &VendorRules,
) -> Result<CodeMatch, FicheError> {
    let bytes = std::fs::read(path)?;
    crate::extract_document(&bytes, extractor, rules)
}

/// PDF file names in `dir` starting with `prefix`, both compared
/// case-insensitively, sorted.
fn list_pdfs(dir: &Path, prefix: &str) -> Result<Vec<String>, FicheError> {
    let prefix = prefix.to_lowercase();
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %entry.path().display(), "skipping file with non UTF-8 name");
            continue;
        };
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") && lower.starts_with(&prefix) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn require_file(path: &Path, what: &'static str) -> Result<(), FicheError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(FicheError::MissingInput {
            what,
            path: path.to_path_buf(),
        })
    }
}

fn require_dir(path: &Path, what: &'static str) -> Result<(), FicheError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(FicheError::MissingInput {
            what,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"%PDF-1.4").unwrap();
    }

    #[test]
    fn test_list_pdfs_sorted_and_case_insensitive() {
        let dir = TempDir::new().unwrap();
        for name in ["b.PDF", "a.pdf", "notes.txt", "c.pdf.bak"] {
            touch(dir.path(), name);
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        assert_eq!(list_pdfs(dir.path(), "").unwrap(), vec!["a.pdf", "b.PDF"]);
    }

    #[test]
    fn test_list_pdfs_prefix() {
        let dir = TempDir::new().unwrap();
        for name in ["R1001.pdf", "r1002.PDF", "X1003.pdf", "Rapport.txt"] {
            touch(dir.path(), name);
        }
        assert_eq!(
            list_pdfs(dir.path(), "R").unwrap(),
            vec!["R1001.pdf", "r1002.PDF"]
        );
    }

    #[test]
    fn test_rename_missing_inputs_are_fatal() {
        let dir = TempDir::new().unwrap();
        let rules = VendorRules::builtin().unwrap();
        let err = run_rename(
            &dir.path().join("ean_codes.csv"),
            &dir.path().join("FICHIER GENERAL.xlsx"),
            &CatalogLayout::default(),
            &rules,
            dir.path(),
            &dir.path().join("out"),
        )
        .unwrap_err();
        assert!(matches!(err, FicheError::MissingInput { what: "ledger", .. }));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_rename_unreadable_catalog_leaves_dest_untouched() {
        let dir = TempDir::new().unwrap();
        let rules = VendorRules::builtin().unwrap();
        std::fs::write(
            dir.path().join("ean_codes.csv"),
            "Filename;EAN Codes;Fournisseur\nfiche.pdf;3760123456789;\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("FICHIER GENERAL.xlsx"), b"not a workbook").unwrap();
        touch(dir.path(), "fiche.pdf");

        let err = run_rename(
            &dir.path().join("ean_codes.csv"),
            &dir.path().join("FICHIER GENERAL.xlsx"),
            &CatalogLayout::default(),
            &rules,
            dir.path(),
            &dir.path().join("out"),
        )
        .unwrap_err();
        assert!(matches!(err, FicheError::CatalogLoad { .. }));
        assert!(!dir.path().join("out").exists());
        assert!(dir.path().join("fiche.pdf").exists());
    }

    #[test]
    fn test_images_missing_input_dir() {
        let dir = TempDir::new().unwrap();
        let err = run_images(&dir.path().join("absent"), &dir.path().join("img"), "R").unwrap_err();
        assert!(matches!(err, FicheError::MissingInput { .. }));
    }
}
