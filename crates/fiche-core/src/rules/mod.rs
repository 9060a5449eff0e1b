pub mod builtin;
pub mod schema;

use crate::error::FicheError;
use regex::Regex;
use schema::{Precedence, VendorRuleDef, VendorRuleSetDef};
use std::collections::HashSet;
use std::path::Path;

/// Load a vendor rule set from a JSON file.
pub fn load_rules(path: &Path) -> Result<VendorRuleSetDef, FicheError> {
    let content = std::fs::read_to_string(path).map_err(|e| FicheError::RulesLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_rules(&content, path)
}

/// Parse a vendor rule set from a JSON string.
pub fn parse_rules(json: &str, source: &Path) -> Result<VendorRuleSetDef, FicheError> {
    let ruleset: VendorRuleSetDef =
        serde_json::from_str(json).map_err(|e| FicheError::RulesLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Parse a vendor rule set from a JSON string (no file path context).
pub fn parse_rules_str(json: &str) -> Result<VendorRuleSetDef, FicheError> {
    let ruleset: VendorRuleSetDef = serde_json::from_str(json).map_err(FicheError::Json)?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Validate that a rule set is well-formed.
pub fn validate_ruleset(ruleset: &VendorRuleSetDef) -> Result<(), FicheError> {
    compile_pattern("ean_pattern", &ruleset.ean_pattern)?;

    let mut seen = HashSet::new();
    for rule in &ruleset.vendors {
        let tag = rule.vendor.trim();
        if tag.is_empty() {
            return Err(FicheError::RulesInvalid(
                "vendor tag must not be empty".into(),
            ));
        }
        // The ledger joins codes with ';' and an empty tag means "generic barcode"
        if tag.contains(';') || tag != rule.vendor {
            return Err(FicheError::RulesInvalid(format!(
                "vendor tag '{}' must not contain ';' or surrounding whitespace",
                rule.vendor
            )));
        }
        if !seen.insert(tag.to_string()) {
            return Err(FicheError::RulesInvalid(format!(
                "vendor '{}' is defined more than once",
                tag
            )));
        }

        if rule.signature.is_empty() {
            return Err(FicheError::RulesInvalid(format!(
                "vendor '{}' has an empty signature",
                tag
            )));
        }

        let code = compile_pattern(tag, &rule.code_pattern)?;
        if code.captures_len() != 2 {
            return Err(FicheError::RulesInvalid(format!(
                "vendor '{}' code pattern must have exactly one capture group, found {}",
                tag,
                code.captures_len() - 1
            )));
        }
    }

    Ok(())
}

/// Non-fatal issues worth reporting for a valid rule set.
pub fn ruleset_warnings(ruleset: &VendorRuleSetDef) -> Vec<String> {
    let mut warnings = Vec::new();
    for rule in &ruleset.vendors {
        if rule.brand.as_deref().map(str::trim).unwrap_or("").is_empty() {
            warnings.push(format!(
                "vendor '{}' has no catalog brand; its codes will never resolve",
                rule.vendor
            ));
        }
    }
    if ruleset.vendors.is_empty() {
        warnings.push("no vendors defined; only generic barcodes will be extracted".into());
    }
    warnings
}

fn compile_pattern(owner: &str, pattern: &str) -> Result<Regex, FicheError> {
    Regex::new(pattern).map_err(|e| {
        FicheError::RulesInvalid(format!("pattern for '{}' does not compile: {}", owner, e))
    })
}

/// A vendor rule with its code pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledVendor {
    pub def: VendorRuleDef,
    pub code: Regex,
}

/// A validated rule set ready for matching.
#[derive(Debug, Clone)]
pub struct VendorRules {
    pub name: String,
    pub ean: Regex,
    pub vendors: Vec<CompiledVendor>,
}

impl VendorRules {
    pub fn compile(ruleset: &VendorRuleSetDef) -> Result<VendorRules, FicheError> {
        validate_ruleset(ruleset)?;
        let ean = compile_pattern("ean_pattern", &ruleset.ean_pattern)?;
        let vendors = ruleset
            .vendors
            .iter()
            .map(|def| {
                Ok(CompiledVendor {
                    code: compile_pattern(&def.vendor, &def.code_pattern)?,
                    def: def.clone(),
                })
            })
            .collect::<Result<Vec<_>, FicheError>>()?;

        Ok(VendorRules {
            name: ruleset.name.clone(),
            ean,
            vendors,
        })
    }

    /// Compile the built-in rule set.
    pub fn builtin() -> Result<VendorRules, FicheError> {
        Self::compile(&builtin::load_builtin()?)
    }

    pub fn vendor(&self, tag: &str) -> Option<&CompiledVendor> {
        self.vendors.iter().find(|v| v.def.vendor == tag)
    }

    /// Vendors of one precedence class, in declaration order.
    pub fn with_precedence(
        &self,
        precedence: Precedence,
    ) -> impl Iterator<Item = &CompiledVendor> + '_ {
        self.vendors
            .iter()
            .filter(move |v| v.def.precedence == precedence)
    }
}
