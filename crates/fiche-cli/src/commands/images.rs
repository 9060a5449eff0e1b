use std::path::Path;

use fiche_core::batch::run_images;
use fiche_core::error::FicheError;

use crate::output;

pub fn run(input: &Path, dest: &Path, prefix: &str, output_format: &str) -> Result<(), FicheError> {
    let report = run_images(input, dest, prefix)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_images(&report, dest),
    }
    Ok(())
}
