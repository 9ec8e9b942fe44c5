use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Unsupported file format: {0} (expected csv, xls or xlsx)")]
    UnsupportedFormat(String),

    #[error("File path cannot be empty")]
    EmptyPath,

    #[error("Table unreadable: {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("No worksheet found in {0}")]
    NoWorksheet(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
