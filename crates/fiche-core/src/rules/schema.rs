use serde::{Deserialize, Serialize};

pub const DEFAULT_EAN_PATTERN: &str = r"\b[0-9]{13}\b";

/// A set of vendor rules: how to spot each supplier's sheets and where their
/// product code sits in the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRuleSetDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Pattern for generic barcodes; every match is a candidate code.
    #[serde(default = "default_ean_pattern")]
    pub ean_pattern: String,
    /// Evaluated in order within each precedence class.
    pub vendors: Vec<VendorRuleDef>,
}

fn default_ean_pattern() -> String {
    DEFAULT_EAN_PATTERN.to_string()
}

/// A single supplier format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRuleDef {
    /// Tag written to the ledger's `Fournisseur` column.
    pub vendor: String,
    /// Literal substring that identifies the supplier's sheets.
    pub signature: String,
    /// Regex with exactly one capture group holding the product code.
    pub code_pattern: String,
    pub precedence: Precedence,
    /// Catalog brand value the lookup map is filtered on.
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub lookup: LookupKind,
    #[serde(default)]
    pub note: Option<String>,
}

/// How a vendor code competes with barcodes found on the same sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// A captured code replaces any barcodes.
    Override,
    /// Only used when the sheet carries no barcode. The vendor tag sticks
    /// even when no code is captured.
    Fallback,
}

/// How a vendor code is resolved against the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    /// The code equals the supplier reference; one product per code.
    #[default]
    Exact,
    /// The code is the digit prefix shared by a family of references.
    BaseCode,
}
