pub mod extract;
pub mod images;
pub mod inspect;
pub mod rename;
pub mod rules;

use std::path::PathBuf;

use fiche_core::error::FicheError;
use fiche_core::rules::VendorRules;

/// Compile the custom rule file if one was given, else the built-in rules.
fn vendor_rules(custom: Option<PathBuf>) -> Result<VendorRules, FicheError> {
    match custom {
        Some(path) => {
            let ruleset = fiche_core::rules::load_rules(&path)?;
            for warning in fiche_core::rules::ruleset_warnings(&ruleset) {
                tracing::warn!("{}: {}", path.display(), warning);
            }
            VendorRules::compile(&ruleset)
        }
        None => VendorRules::builtin(),
    }
}
