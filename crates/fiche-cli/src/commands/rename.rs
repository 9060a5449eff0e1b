use std::path::{Path, PathBuf};

use fiche_core::batch::run_rename;
use fiche_core::catalog::CatalogLayout;
use fiche_core::error::FicheError;

use crate::output;

pub fn run(
    ledger: &Path,
    catalog: &Path,
    input: &Path,
    dest: &Path,
    rule_file: Option<PathBuf>,
    layout: &CatalogLayout,
    output_format: &str,
) -> Result<(), FicheError> {
    let rules = super::vendor_rules(rule_file)?;
    let report = run_rename(ledger, catalog, layout, &rules, input, dest)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_rename(&report),
    }
    Ok(())
}
