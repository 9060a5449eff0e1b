use std::path::Path;

use calamine::{Data, Range, Reader};

use crate::catalog::CatalogLayout;
use crate::error::FicheError;
use crate::model::CatalogEntry;

/// Read the product rows of the first sheet of a workbook (xlsx, xls or ods).
pub fn load_entries(path: &Path, layout: &CatalogLayout) -> Result<Vec<CatalogEntry>, FicheError> {
    let load_err = |reason: String| FicheError::CatalogLoad {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook =
        calamine::open_workbook_auto(path).map_err(|e| load_err(format!("failed to open: {e}")))?;

    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| load_err("workbook has no sheet".into()))?
        .map_err(|e| load_err(format!("failed to read first sheet: {e}")))?;

    Ok(entries_from_range(&sheet, layout))
}

/// Turn every row below the header row into a catalog entry.
///
/// Columns are taken by position; header labels are never read.
pub fn entries_from_range(sheet: &Range<Data>, layout: &CatalogLayout) -> Vec<CatalogEntry> {
    let Some((last_row, _)) = sheet.end() else {
        return Vec::new();
    };

    let text_at = |row: u32, col: u32| sheet.get_value((row, col)).and_then(cell_as_string);

    (layout.header_row + 1..=last_row)
        .map(|row| CatalogEntry {
            row: row + 1,
            product_name: text_at(row, layout.product_name_col),
            ean13: text_at(row, layout.ean_col),
            supplier_reference: text_at(row, layout.supplier_reference_col),
            brand: text_at(row, layout.brand_col),
        })
        .collect()
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        // Integral floats print without a fractional part ("3760123456789")
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::DateTime(dt) => Some(dt.to_string()),
        Data::Empty | Data::Error(_) => None,
        _ => Some(format!("{cell}")),
    }
}
