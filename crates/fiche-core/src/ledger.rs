//! The `;`-delimited CSV handed from the extraction phase to the rename phase.
//!
//! Columns: `Filename`, `EAN Codes` (codes joined by `;`, so the field is
//! quoted when it holds several), `Fournisseur` (vendor tag, empty for plain
//! barcodes).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::FicheError;
use crate::model::{LedgerEntry, VendorTag};

pub const FILENAME_COLUMN: &str = "Filename";
pub const CODES_COLUMN: &str = "EAN Codes";
pub const VENDOR_COLUMN: &str = "Fournisseur";

const DELIMITER: u8 = b';';
const CODE_SEPARATOR: &str = ";";

/// Streams ledger rows as documents are processed.
pub struct LedgerWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl LedgerWriter<File> {
    pub fn create(path: &Path) -> Result<Self, FicheError> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> LedgerWriter<W> {
    /// Wrap a writer and emit the header row.
    pub fn from_writer(writer: W) -> Result<Self, FicheError> {
        let mut inner = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_writer(writer);
        inner.write_record([FILENAME_COLUMN, CODES_COLUMN, VENDOR_COLUMN])?;
        Ok(LedgerWriter { inner })
    }

    pub fn write(&mut self, entry: &LedgerEntry) -> Result<(), FicheError> {
        let codes = entry.codes.join(CODE_SEPARATOR);
        self.inner
            .write_record([entry.filename.as_str(), &codes, entry.vendor.as_ledger()])?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), FicheError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Read a ledger file. A missing file is fatal for the rename phase.
pub fn read_ledger(path: &Path) -> Result<Vec<LedgerEntry>, FicheError> {
    if !path.is_file() {
        return Err(FicheError::MissingInput {
            what: "ledger",
            path: path.to_path_buf(),
        });
    }
    read_ledger_from(File::open(path)?, path)
}

/// Read ledger rows from any reader. Columns are located by header name.
pub fn read_ledger_from<R: Read>(reader: R, source: &Path) -> Result<Vec<LedgerEntry>, FicheError> {
    let ledger_err = |reason: String| FicheError::Ledger {
        path: source.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
    };
    let filename_idx = column(FILENAME_COLUMN)
        .ok_or_else(|| ledger_err(format!("missing '{FILENAME_COLUMN}' column")))?;
    let codes_idx = column(CODES_COLUMN)
        .ok_or_else(|| ledger_err(format!("missing '{CODES_COLUMN}' column")))?;
    let vendor_idx = column(VENDOR_COLUMN);

    let mut entries = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let filename = record.get(filename_idx).unwrap_or("").trim();
        if filename.is_empty() {
            tracing::warn!(line = i + 2, "ledger row without filename skipped");
            continue;
        }

        let codes = split_codes(record.get(codes_idx).unwrap_or(""));
        let vendor = vendor_idx
            .and_then(|idx| record.get(idx))
            .map(VendorTag::from_ledger)
            .unwrap_or_default();

        entries.push(LedgerEntry {
            filename: filename.to_string(),
            codes,
            vendor,
        });
    }

    Ok(entries)
}

fn split_codes(field: &str) -> Vec<String> {
    field
        .split(CODE_SEPARATOR)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}
