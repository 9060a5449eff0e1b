use serde::{Deserialize, Serialize};
use std::fmt;

/// Supplier format a document was recognized as.
///
/// `Generic` means the codes are plain barcodes looked up in the EAN map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VendorTag {
    #[default]
    Generic,
    Supplier(String),
}

impl VendorTag {
    pub fn supplier(tag: &str) -> VendorTag {
        VendorTag::Supplier(tag.to_string())
    }

    /// Parse the ledger's `Fournisseur` column (empty = generic).
    pub fn from_ledger(value: &str) -> VendorTag {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            VendorTag::Generic
        } else {
            VendorTag::Supplier(trimmed.to_string())
        }
    }

    /// Value written to the ledger's `Fournisseur` column.
    pub fn as_ledger(&self) -> &str {
        match self {
            VendorTag::Generic => "",
            VendorTag::Supplier(tag) => tag,
        }
    }
}

impl fmt::Display for VendorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorTag::Generic => write!(f, "EAN"),
            VendorTag::Supplier(tag) => write!(f, "{tag}"),
        }
    }
}

/// Codes found in one document's text, before they are tied to a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMatch {
    /// Deduplicated, in order of first appearance.
    pub codes: Vec<String>,
    pub vendor: VendorTag,
}

/// Where a ledger row's codes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSource {
    Content,
    Filename,
    /// The document could not be decoded; the row carries no codes.
    Failed,
}

/// Persisted extraction result for one document: one ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub filename: String,
    pub codes: Vec<String>,
    pub vendor: VendorTag,
}

impl LedgerEntry {
    pub fn new(filename: impl Into<String>, found: CodeMatch) -> Self {
        LedgerEntry {
            filename: filename.into(),
            codes: found.codes,
            vendor: found.vendor,
        }
    }

    pub fn empty(filename: impl Into<String>) -> Self {
        Self::new(filename, CodeMatch::default())
    }
}

/// One product row of the catalog spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 1-based spreadsheet row, for diagnostics.
    pub row: u32,
    pub product_name: Option<String>,
    pub ean13: Option<String>,
    pub supplier_reference: Option<String>,
    pub brand: Option<String>,
}
