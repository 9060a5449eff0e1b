use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::KeyCollision;
use crate::model::VendorTag;

/// What happened to one ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome {
    /// At least one destination was written.
    Placed,
    /// The ledger row carried no codes.
    NoCodes,
    /// The source document is not in the input directory.
    Missing,
    /// None of the codes resolved to a product.
    NoMatch,
    /// Codes resolved but the source could not be read.
    SourceUnreadable,
    /// Codes resolved but every destination write failed.
    PlacementFailed,
}

/// A destination that could not be written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationFailure {
    pub product_name: String,
    pub reason: String,
}

/// Result of dispatching one ledger row.
///
/// `source_removed` is only ever true when `destinations` is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub source: PathBuf,
    pub vendor: VendorTag,
    pub outcome: RowOutcome,
    /// Files written, in code order then catalog order.
    pub destinations: Vec<PathBuf>,
    /// Codes with no product in the vendor's lookup.
    pub unresolved_codes: Vec<String>,
    pub failures: Vec<DestinationFailure>,
    pub source_removed: bool,
}

impl PlacementRecord {
    pub fn skipped(source: PathBuf, vendor: VendorTag, outcome: RowOutcome) -> Self {
        PlacementRecord {
            source,
            vendor,
            outcome,
            destinations: Vec::new(),
            unresolved_codes: Vec::new(),
            failures: Vec::new(),
            source_removed: false,
        }
    }
}

/// Counters for a whole rename run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSummary {
    pub rows: usize,
    pub placed: usize,
    pub no_codes: usize,
    pub missing: usize,
    pub no_match: usize,
    pub source_unreadable: usize,
    pub placement_failed: usize,
    pub destinations_created: usize,
    pub destination_failures: usize,
    pub unresolved_codes: usize,
    /// Rows whose destinations were written but whose source could not be deleted.
    pub sources_not_removed: usize,
}

impl RenameSummary {
    pub fn record(&mut self, placement: &PlacementRecord) {
        self.rows += 1;
        match placement.outcome {
            RowOutcome::Placed => self.placed += 1,
            RowOutcome::NoCodes => self.no_codes += 1,
            RowOutcome::Missing => self.missing += 1,
            RowOutcome::NoMatch => self.no_match += 1,
            RowOutcome::SourceUnreadable => self.source_unreadable += 1,
            RowOutcome::PlacementFailed => self.placement_failed += 1,
        }
        self.destinations_created += placement.destinations.len();
        self.destination_failures += placement.failures.len();
        self.unresolved_codes += placement.unresolved_codes.len();
        if placement.outcome == RowOutcome::Placed && !placement.source_removed {
            self.sources_not_removed += 1;
        }
    }
}

/// Everything a rename run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameReport {
    pub summary: RenameSummary,
    pub placements: Vec<PlacementRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog_collisions: Vec<KeyCollision>,
}
