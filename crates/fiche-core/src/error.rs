use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FicheError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to parse PDF: {0}")]
    PdfParse(#[from] lopdf::Error),

    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("failed to load vendor rules from {path}: {reason}")]
    RulesLoad { path: PathBuf, reason: String },

    #[error("invalid vendor rules: {0}")]
    RulesInvalid(String),

    #[error("failed to load product catalog {path}: {reason}")]
    CatalogLoad { path: PathBuf, reason: String },

    #[error("invalid ledger {path}: {reason}")]
    Ledger { path: PathBuf, reason: String },

    #[error("{what} not found: {path}")]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
