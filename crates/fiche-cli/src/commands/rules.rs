use std::path::Path;

use fiche_core::error::FicheError;
use fiche_core::rules::builtin;
use fiche_core::rules::schema::{LookupKind, Precedence, VendorRuleSetDef};

pub fn list() -> Result<(), FicheError> {
    let rs = builtin::load_builtin()?;
    println!("Built-in vendor rules: {} (v{})\n", rs.name, rs.version);
    if let Some(ref desc) = rs.description {
        println!("{}\n", desc);
    }
    print_ruleset(&rs);
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), FicheError> {
    let rs = fiche_core::rules::load_rules(file)?;

    println!("Rule set '{}' (v{}) is valid.", rs.name, rs.version);
    println!("  Vendors: {}", rs.vendors.len());
    println!();
    print_ruleset(&rs);

    let warnings = fiche_core::rules::ruleset_warnings(&rs);
    if !warnings.is_empty() {
        println!("Warnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

fn print_ruleset(rs: &VendorRuleSetDef) {
    println!("  {:<10} {}", "EAN", rs.ean_pattern);
    println!("             every match is a candidate barcode");
    println!();

    for v in &rs.vendors {
        let precedence = match v.precedence {
            Precedence::Override => "overrides barcodes when a code is captured",
            Precedence::Fallback => "used only when no barcode is found",
        };
        let lookup = match v.lookup {
            LookupKind::Exact => "exact reference",
            LookupKind::BaseCode => "reference family (base code)",
        };
        println!("  {:<10} signature \"{}\"", v.vendor, v.signature);
        println!("             code      {}", v.code_pattern);
        println!("             {}", precedence);
        println!(
            "             catalog   {} by brand {}",
            lookup,
            v.brand.as_deref().unwrap_or("-")
        );
        if let Some(ref note) = v.note {
            println!("             {}", note);
        }
        println!();
    }
}
