use std::path::Path;

use fiche_core::batch::{ExtractionReport, ImageReport};
use fiche_core::dispatch::outcome::RowOutcome;
use fiche_core::dispatch::RenameReport;
use fiche_core::inspect::DocumentStructure;
use fiche_core::model::CodeSource;

pub fn print_extraction(report: &ExtractionReport, ledger: &Path) {
    let max_name = report
        .documents
        .iter()
        .map(|d| d.filename.chars().count())
        .max()
        .unwrap_or(10);

    for doc in &report.documents {
        let vendor = if doc.vendor.is_empty() { "EAN" } else { doc.vendor.as_str() };
        let detail = match doc.source {
            CodeSource::Failed => format!(
                "FAILED  {}",
                doc.error.as_deref().unwrap_or("unreadable document")
            ),
            _ if doc.codes.is_empty() => "-".to_string(),
            CodeSource::Filename => format!("{:<9} {}  (file name)", vendor, doc.codes.join(", ")),
            CodeSource::Content => format!("{:<9} {}", vendor, doc.codes.join(", ")),
        };
        println!("  {:<width$}  {}", doc.filename, detail, width = max_name);
    }

    let s = &report.summary;
    println!();
    println!("=== Extraction ===\n");
    println!("  Documents:       {}", s.documents);
    println!("  With codes:      {}", s.with_codes);
    println!("  Without codes:   {}", s.without_codes);
    if s.from_filename > 0 {
        println!("  From file name:  {}", s.from_filename);
    }
    println!("  Failures:        {}", s.failures);
    for (vendor, count) in &s.by_vendor {
        println!("    {:<14} {}", vendor, count);
    }
    println!("\n  Ledger written to {}", ledger.display());
}

pub fn print_rename(report: &RenameReport) {
    for placement in &report.placements {
        let file = placement
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let status = match placement.outcome {
            RowOutcome::Placed => "placed",
            RowOutcome::NoCodes => "no codes",
            RowOutcome::Missing => "missing",
            RowOutcome::NoMatch => "no match",
            RowOutcome::SourceUnreadable => "unreadable",
            RowOutcome::PlacementFailed => "failed",
        };
        println!("  {} [{}] {}", file, placement.vendor, status);

        for dest in &placement.destinations {
            let name = dest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("    -> {}", name);
        }
        for code in &placement.unresolved_codes {
            println!("    ?  {} not in catalog", code);
        }
        for failure in &placement.failures {
            println!("    !  {}: {}", failure.product_name, failure.reason);
        }
        if placement.outcome == RowOutcome::Placed && !placement.source_removed {
            println!("    !  source kept: could not be removed");
        }
    }

    if !report.catalog_collisions.is_empty() {
        println!("\nCatalog key collisions (last row wins):");
        for c in &report.catalog_collisions {
            println!(
                "  {} {}: '{}' replaced by '{}' (row {})",
                c.map, c.key, c.previous, c.replacement, c.row
            );
        }
    }

    let s = &report.summary;
    println!();
    println!("=== Rename ===\n");
    println!("  Rows:                  {}", s.rows);
    println!("  Placed:                {}", s.placed);
    println!("  Destinations created:  {}", s.destinations_created);
    println!("  No codes:              {}", s.no_codes);
    println!("  Missing source:        {}", s.missing);
    println!("  No catalog match:      {}", s.no_match);
    println!("  Unresolved codes:      {}", s.unresolved_codes);
    println!("  Destination failures:  {}", s.destination_failures);
    if s.source_unreadable + s.placement_failed + s.sources_not_removed > 0 {
        println!("  Unreadable sources:    {}", s.source_unreadable);
        println!("  Rows with no write:    {}", s.placement_failed);
        println!("  Sources not removed:   {}", s.sources_not_removed);
    }
}

pub fn print_images(report: &ImageReport, dest: &Path) {
    for doc in &report.documents {
        match (&doc.error, doc.images_written) {
            (Some(e), _) => println!("  {}  FAILED  {}", doc.filename, e),
            (None, 0) => println!("  {}  no images", doc.filename),
            (None, n) => println!("  {}  {} image(s)", doc.filename, n),
        }
        if doc.image_failures > 0 {
            println!("    !  {} image(s) could not be decoded", doc.image_failures);
        }
    }

    let s = &report.summary;
    println!();
    println!("=== Images ===\n");
    println!("  Documents:          {}", s.documents);
    println!("  Images written:     {}", s.images_written);
    println!("  Without images:     {}", s.documents_without_images);
    println!("  Undecodable images: {}", s.image_failures);
    println!("  Failed documents:   {}", s.failures);
    println!("\n  Images written to {}", dest.display());
}

pub fn print_structure(doc: &DocumentStructure) {
    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("PDF STRUCTURE: {}", doc.file_name);
    println!("{rule}");

    println!("\nVersion: {}", doc.version);
    println!("Pages: {}", doc.page_count);

    println!("\nMetadata:");
    if doc.metadata.is_empty() {
        println!("  none");
    }
    for field in &doc.metadata {
        println!("  {}: {}", field.key, field.value);
    }

    println!("\nPages:");
    for page in &doc.pages {
        println!("\nPage {}:", page.number);
        match (page.width, page.height) {
            (Some(w), Some(h)) => println!("  Size: {} x {} points", w, h),
            _ => println!("  Size: unknown"),
        }
        match &page.text_preview {
            Some(text) => println!("  Text: {}", text),
            None => println!("  No extractable text"),
        }
        if page.image_count > 0 {
            println!("  Images: {}", page.image_count);
        } else {
            println!("  No images");
        }
    }

    println!("\n{rule}");
}
