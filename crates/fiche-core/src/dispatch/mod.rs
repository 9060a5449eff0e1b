pub mod naming;
pub mod outcome;

use std::path::PathBuf;

use crate::catalog::{CatalogMatch, ProductCatalog};
use crate::model::LedgerEntry;
use naming::{create_unique, original_extension, sanitize_filename};
use outcome::{DestinationFailure, PlacementRecord, RowOutcome};

pub use outcome::{RenameReport, RenameSummary};

/// Places source documents under catalog product names.
///
/// Every destination is written from the source's original bytes; the source
/// is deleted only after all destinations of its row were attempted, and only
/// when at least one was written.
pub struct RenameDispatcher<'a> {
    catalog: &'a ProductCatalog,
    source_dir: PathBuf,
    dest_dir: PathBuf,
}

impl<'a> RenameDispatcher<'a> {
    pub fn new(
        catalog: &'a ProductCatalog,
        source_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        RenameDispatcher {
            catalog,
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
        }
    }

    /// Dispatch one ledger row. Failures stay inside the returned record.
    pub fn dispatch(&self, entry: &LedgerEntry) -> PlacementRecord {
        let source = self.source_dir.join(&entry.filename);
        let vendor = entry.vendor.clone();
        let _span = tracing::info_span!("dispatch", file = %entry.filename, vendor = %vendor).entered();

        if entry.codes.is_empty() {
            tracing::info!("skipping '{}': no codes", entry.filename);
            return PlacementRecord::skipped(source, vendor, RowOutcome::NoCodes);
        }

        if !source.is_file() {
            tracing::warn!("skipping '{}': file missing", entry.filename);
            return PlacementRecord::skipped(source, vendor, RowOutcome::Missing);
        }

        if !self.catalog.knows_vendor(&vendor) {
            tracing::warn!("no catalog lookup for vendor '{}'", vendor);
        }

        let mut record = PlacementRecord::skipped(source.clone(), vendor, RowOutcome::NoMatch);
        let mut targets: Vec<CatalogMatch> = Vec::new();
        for code in &entry.codes {
            let matches = self.catalog.resolve(&record.vendor, code);
            if matches.is_empty() {
                tracing::warn!(
                    "code '{}' from '{}': not found in {} lookup",
                    code,
                    entry.filename,
                    record.vendor
                );
                record.unresolved_codes.push(code.clone());
                continue;
            }
            if matches.len() > 1 {
                tracing::info!(%code, products = matches.len(), "code resolves to a product family");
            }
            targets.extend(matches);
        }

        if targets.is_empty() {
            tracing::warn!("'{}' left in place: no valid codes", entry.filename);
            return record;
        }

        let content = match std::fs::read(&source) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("'{}' left in place: cannot read source: {}", entry.filename, e);
                record.outcome = RowOutcome::SourceUnreadable;
                return record;
            }
        };

        let extension = original_extension(&entry.filename);
        for target in targets {
            let stem = sanitize_filename(&target.product_name);
            if stem.is_empty() {
                tracing::warn!(
                    "product name '{}' is empty once sanitized",
                    target.product_name
                );
                record.failures.push(DestinationFailure {
                    product_name: target.product_name,
                    reason: "empty file name after sanitizing".into(),
                });
                continue;
            }

            match create_unique(&self.dest_dir, &stem, &extension, &content) {
                Ok(path) => {
                    tracing::info!(
                        reference = target.supplier_reference.as_deref().unwrap_or(""),
                        "'{}' -> '{}'",
                        entry.filename,
                        path.file_name().and_then(|n| n.to_str()).unwrap_or(stem.as_str())
                    );
                    record.destinations.push(path);
                }
                Err(e) => {
                    tracing::warn!("failed to write '{}{}': {}", stem, extension, e);
                    record.failures.push(DestinationFailure {
                        product_name: target.product_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if record.destinations.is_empty() {
            tracing::warn!("'{}' left in place: every destination failed", entry.filename);
            record.outcome = RowOutcome::PlacementFailed;
            return record;
        }

        record.outcome = RowOutcome::Placed;
        match std::fs::remove_file(&source) {
            Ok(()) => record.source_removed = true,
            Err(e) => tracing::warn!(
                "'{}' placed {} time(s) but could not be removed: {}",
                entry.filename,
                record.destinations.len(),
                e
            ),
        }
        record
    }

    /// Dispatch every row in ledger order.
    pub fn dispatch_all(&self, entries: &[LedgerEntry]) -> (RenameSummary, Vec<PlacementRecord>) {
        let mut summary = RenameSummary::default();
        let placements: Vec<PlacementRecord> = entries
            .iter()
            .map(|entry| {
                let placement = self.dispatch(entry);
                summary.record(&placement);
                placement
            })
            .collect();
        (summary, placements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogEntry, CodeMatch, VendorTag};
    use crate::rules::VendorRules;
    use std::path::Path;
    use tempfile::TempDir;

    struct Dirs {
        _root: TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    fn dirs() -> Dirs {
        let root = TempDir::new().unwrap();
        let input = root.path().join("in");
        let output = root.path().join("out");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::create_dir_all(&output).unwrap();
        Dirs {
            _root: root,
            input,
            output,
        }
    }

    fn catalog() -> ProductCatalog {
        let row = |row, name: &str, ean: Option<&str>, reference: Option<&str>, brand: Option<&str>| {
            CatalogEntry {
                row,
                product_name: Some(name.into()),
                ean13: ean.map(String::from),
                supplier_reference: reference.map(String::from),
                brand: brand.map(String::from),
            }
        };
        let entries = vec![
            row(8, "Gant nitrile", Some("3760123456789"), None, None),
            row(9, "Masque FFP2", Some("3760123456796"), None, None),
            row(10, "Veste T1", None, Some("7110-T1"), Some("LMA")),
            row(11, "Veste T2", None, Some("7110-T2"), Some("LMA")),
            row(12, "Veste T3", None, Some("7110 T3"), Some("LMA")),
            row(13, "Bougie <NGK>", None, Some("123456"), Some("AUTOBEST")),
            row(14, "<>", None, Some("8120-A"), Some("LMA")),
            row(15, "Pantalon T4", None, Some("8120-B"), Some("LMA")),
        ];
        ProductCatalog::build(&entries, &VendorRules::builtin().unwrap())
    }

    fn entry(filename: &str, codes: &[&str], vendor: VendorTag) -> LedgerEntry {
        LedgerEntry::new(
            filename,
            CodeMatch {
                codes: codes.iter().map(|c| c.to_string()).collect(),
                vendor,
            },
        )
    }

    fn out_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_no_codes_leaves_source() {
        let d = dirs();
        std::fs::write(d.input.join("a.pdf"), b"%PDF").unwrap();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        let rec = dispatcher.dispatch(&entry("a.pdf", &[], VendorTag::Generic));
        assert_eq!(rec.outcome, RowOutcome::NoCodes);
        assert!(d.input.join("a.pdf").exists());
        assert!(out_names(&d.output).is_empty());
    }

    #[test]
    fn test_missing_source_is_skipped() {
        let d = dirs();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        let rec = dispatcher.dispatch(&entry("absent.pdf", &["3760123456789"], VendorTag::Generic));
        assert_eq!(rec.outcome, RowOutcome::Missing);
        assert!(out_names(&d.output).is_empty());
    }

    #[test]
    fn test_single_ean_moves_source() {
        let d = dirs();
        std::fs::write(d.input.join("fiche.pdf"), b"%PDF-gant").unwrap();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        let rec = dispatcher.dispatch(&entry("fiche.pdf", &["3760123456789"], VendorTag::Generic));
        assert_eq!(rec.outcome, RowOutcome::Placed);
        assert!(rec.source_removed);
        assert!(!d.input.join("fiche.pdf").exists());
        assert_eq!(out_names(&d.output), vec!["Gant nitrile.pdf"]);
        assert_eq!(
            std::fs::read(d.output.join("Gant nitrile.pdf")).unwrap(),
            b"%PDF-gant"
        );
    }

    #[test]
    fn test_lma_family_fans_out_from_original_bytes() {
        let d = dirs();
        std::fs::write(d.input.join("lma.pdf"), b"%PDF-veste").unwrap();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        let rec = dispatcher.dispatch(&entry("lma.pdf", &["7110"], VendorTag::supplier("LMA")));
        assert_eq!(rec.outcome, RowOutcome::Placed);
        assert_eq!(rec.destinations.len(), 3);
        assert!(!d.input.join("lma.pdf").exists());
        assert_eq!(
            out_names(&d.output),
            vec!["Veste T1.pdf", "Veste T2.pdf", "Veste T3.pdf"]
        );
        for path in &rec.destinations {
            assert_eq!(std::fs::read(path).unwrap(), b"%PDF-veste");
        }
    }

    #[test]
    fn test_unresolved_codes_do_not_abort_row() {
        let d = dirs();
        std::fs::write(d.input.join("multi.pdf"), b"%PDF").unwrap();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        let rec = dispatcher.dispatch(&entry(
            "multi.pdf",
            &["0000000000000", "3760123456796", "3760123456789"],
            VendorTag::Generic,
        ));
        assert_eq!(rec.outcome, RowOutcome::Placed);
        assert_eq!(rec.unresolved_codes, vec!["0000000000000"]);
        assert_eq!(
            out_names(&d.output),
            vec!["Gant nitrile.pdf", "Masque FFP2.pdf"]
        );
        assert!(rec.destinations[0].ends_with("Masque FFP2.pdf"));
    }

    #[test]
    fn test_no_match_leaves_source() {
        let d = dirs();
        std::fs::write(d.input.join("inconnu.pdf"), b"%PDF").unwrap();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        let rec = dispatcher.dispatch(&entry("inconnu.pdf", &["9999"], VendorTag::supplier("LMA")));
        assert_eq!(rec.outcome, RowOutcome::NoMatch);
        assert!(!rec.source_removed);
        assert!(d.input.join("inconnu.pdf").exists());
        assert!(out_names(&d.output).is_empty());
    }

    #[test]
    fn test_vendor_selects_lookup_and_name_is_sanitized() {
        let d = dirs();
        std::fs::write(d.input.join("123456.PDF"), b"%PDF").unwrap();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        // The AUTOBEST reference means nothing as a barcode
        let rec = dispatcher.dispatch(&entry("123456.PDF", &["123456"], VendorTag::Generic));
        assert_eq!(rec.outcome, RowOutcome::NoMatch);

        let rec = dispatcher.dispatch(&entry("123456.PDF", &["123456"], VendorTag::supplier("AUTOBEST")));
        assert_eq!(rec.outcome, RowOutcome::Placed);
        assert_eq!(out_names(&d.output), vec!["Bougie NGK.PDF"]);
    }

    #[test]
    fn test_same_name_across_rows_gets_suffix() {
        let d = dirs();
        std::fs::write(d.input.join("a.pdf"), b"first").unwrap();
        std::fs::write(d.input.join("b.pdf"), b"second").unwrap();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        let (summary, _) = dispatcher.dispatch_all(&[
            entry("a.pdf", &["3760123456789"], VendorTag::Generic),
            entry("b.pdf", &["3760123456789"], VendorTag::Generic),
        ]);
        assert_eq!(summary.placed, 2);
        assert_eq!(
            std::fs::read(d.output.join("Gant nitrile.pdf")).unwrap(),
            b"first"
        );
        assert_eq!(
            std::fs::read(d.output.join("Gant nitrile_1.pdf")).unwrap(),
            b"second"
        );
    }

    #[test]
    fn test_failed_destinations_keep_source() {
        let d = dirs();
        std::fs::write(d.input.join("a.pdf"), b"%PDF").unwrap();
        let catalog = catalog();
        let missing_out = d.output.join("not-created");
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &missing_out);

        let rec = dispatcher.dispatch(&entry("a.pdf", &["7110"], VendorTag::supplier("LMA")));
        assert_eq!(rec.outcome, RowOutcome::PlacementFailed);
        assert_eq!(rec.failures.len(), 3);
        assert!(!rec.source_removed);
        assert!(d.input.join("a.pdf").exists());
    }

    #[test]
    fn test_one_failed_destination_does_not_stop_the_others() {
        let d = dirs();
        std::fs::write(d.input.join("b.pdf"), b"%PDF-pantalon").unwrap();
        let catalog = catalog();
        let dispatcher = RenameDispatcher::new(&catalog, &d.input, &d.output);

        let rec = dispatcher.dispatch(&entry("b.pdf", &["8120"], VendorTag::supplier("LMA")));
        assert_eq!(rec.outcome, RowOutcome::Placed);
        assert_eq!(rec.failures.len(), 1);
        assert_eq!(rec.failures[0].product_name, "<>");
        assert_eq!(rec.destinations.len(), 1);
        assert!(rec.source_removed);
        assert!(!d.input.join("b.pdf").exists());
        assert_eq!(out_names(&d.output), vec!["Pantalon T4.pdf"]);
    }
}
