pub mod xlsx;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FicheError;
use crate::model::{CatalogEntry, VendorTag};
use crate::rules::schema::LookupKind;
use crate::rules::VendorRules;

/// Fixed positions of the catalog spreadsheet (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLayout {
    /// Row holding the column labels; data starts on the next row.
    pub header_row: u32,
    pub product_name_col: u32,
    pub ean_col: u32,
    pub supplier_reference_col: u32,
    pub brand_col: u32,
}

impl Default for CatalogLayout {
    fn default() -> Self {
        CatalogLayout {
            header_row: 6,
            product_name_col: 3,
            ean_col: 4,
            supplier_reference_col: 5,
            brand_col: 6,
        }
    }
}

/// A product a code resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMatch {
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_reference: Option<String>,
}

/// Lookup table for one vendor's codes.
#[derive(Debug, Clone)]
pub enum VendorMap {
    Exact(HashMap<String, String>),
    /// Base code -> every product of the family, in spreadsheet order.
    BaseCode(HashMap<String, Vec<CatalogMatch>>),
}

impl VendorMap {
    pub fn len(&self) -> usize {
        match self {
            VendorMap::Exact(m) => m.len(),
            VendorMap::BaseCode(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of products reachable through the map.
    pub fn product_count(&self) -> usize {
        match self {
            VendorMap::Exact(m) => m.len(),
            VendorMap::BaseCode(m) => m.values().map(Vec::len).sum(),
        }
    }
}

/// A key that appeared on several rows with different product names.
/// The later row wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyCollision {
    /// "EAN" or the vendor tag.
    pub map: String,
    pub key: String,
    pub row: u32,
    pub previous: String,
    pub replacement: String,
}

/// Code-to-product lookups built once per run from the catalog spreadsheet.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    ean: HashMap<String, String>,
    vendors: HashMap<String, VendorMap>,
    collisions: Vec<KeyCollision>,
}

impl ProductCatalog {
    /// Load the spreadsheet at `path` and build the lookups for `rules`.
    pub fn load(
        path: &Path,
        layout: &CatalogLayout,
        rules: &VendorRules,
    ) -> Result<ProductCatalog, FicheError> {
        if !path.is_file() {
            return Err(FicheError::MissingInput {
                what: "product catalog",
                path: path.to_path_buf(),
            });
        }
        let entries = xlsx::load_entries(path, layout)?;
        let catalog = Self::build(&entries, rules);

        tracing::info!(
            rows = entries.len(),
            ean_codes = catalog.ean.len(),
            "loaded product catalog {}",
            path.display()
        );
        for (tag, map) in &catalog.vendors {
            tracing::info!(
                vendor = %tag,
                codes = map.len(),
                products = map.product_count(),
                "built vendor lookup"
            );
        }
        Ok(catalog)
    }

    /// Build the lookups from already-read rows.
    pub fn build(entries: &[CatalogEntry], rules: &VendorRules) -> ProductCatalog {
        let mut catalog = ProductCatalog::default();

        for entry in entries {
            if let (Some(name), Some(ean)) = (&entry.product_name, &entry.ean13) {
                insert_unique(
                    &mut catalog.ean,
                    &mut catalog.collisions,
                    "EAN",
                    ean,
                    name,
                    entry.row,
                );
            }
        }

        for vendor in &rules.vendors {
            let Some(brand) = vendor.def.brand.as_deref().map(str::trim) else {
                continue;
            };
            let tag = vendor.def.vendor.as_str();

            let rows = entries.iter().filter_map(|e| {
                let name = e.product_name.as_ref()?;
                let reference = e.supplier_reference.as_ref()?;
                (e.brand.as_deref() == Some(brand)).then_some((e.row, name, reference))
            });

            let map = match vendor.def.lookup {
                LookupKind::Exact => {
                    let mut map = HashMap::new();
                    for (row, name, reference) in rows {
                        insert_unique(&mut map, &mut catalog.collisions, tag, reference, name, row);
                    }
                    VendorMap::Exact(map)
                }
                LookupKind::BaseCode => {
                    let mut map: HashMap<String, Vec<CatalogMatch>> = HashMap::new();
                    for (_, name, reference) in rows {
                        if let Some(base) = base_code(reference) {
                            map.entry(base.to_string()).or_default().push(CatalogMatch {
                                product_name: name.clone(),
                                supplier_reference: Some(reference.clone()),
                            });
                        }
                    }
                    VendorMap::BaseCode(map)
                }
            };
            catalog.vendors.insert(tag.to_string(), map);
        }

        catalog
    }

    /// Products a code resolves to for documents of the given vendor.
    ///
    /// Exact lookups yield at most one product; base-code lookups yield the
    /// whole family.
    pub fn resolve(&self, vendor: &VendorTag, code: &str) -> Vec<CatalogMatch> {
        let exact = |map: &HashMap<String, String>| -> Vec<CatalogMatch> {
            map.get(code)
                .map(|name| CatalogMatch {
                    product_name: name.clone(),
                    supplier_reference: None,
                })
                .into_iter()
                .collect()
        };

        match vendor {
            VendorTag::Generic => exact(&self.ean),
            VendorTag::Supplier(tag) => match self.vendors.get(tag) {
                Some(VendorMap::Exact(map)) => exact(map),
                Some(VendorMap::BaseCode(map)) => map.get(code).cloned().unwrap_or_default(),
                None => Vec::new(),
            },
        }
    }

    pub fn knows_vendor(&self, vendor: &VendorTag) -> bool {
        match vendor {
            VendorTag::Generic => true,
            VendorTag::Supplier(tag) => self.vendors.contains_key(tag),
        }
    }

    pub fn ean_count(&self) -> usize {
        self.ean.len()
    }

    pub fn vendor_map(&self, tag: &str) -> Option<&VendorMap> {
        self.vendors.get(tag)
    }

    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }
}

/// Insert with last-write-wins, recording a collision when a key switches
/// to a different product.
fn insert_unique(
    map: &mut HashMap<String, String>,
    collisions: &mut Vec<KeyCollision>,
    map_name: &str,
    key: &str,
    name: &str,
    row: u32,
) {
    if let Some(previous) = map.insert(key.to_string(), name.to_string()) {
        if previous != name {
            tracing::warn!(
                map = map_name,
                key,
                row,
                "duplicate catalog key: '{}' replaces '{}'",
                name,
                previous
            );
            collisions.push(KeyCollision {
                map: map_name.to_string(),
                key: key.to_string(),
                row,
                previous,
                replacement: name.to_string(),
            });
        }
    }
}

/// Digit prefix of a supplier reference, up to the first hyphen or
/// whitespace. Only prefixes of at least 4 digits count.
pub fn base_code(reference: &str) -> Option<&str> {
    let prefix = reference
        .split(|c: char| c == '-' || c.is_whitespace())
        .next()
        .unwrap_or("");
    (prefix.len() >= 4 && prefix.chars().all(|c| c.is_ascii_digit())).then_some(prefix)
}
