pub mod cleaner;
pub mod error;
pub mod finance;
pub mod fmt;
pub mod inference;
pub mod loader;
pub mod models;
pub mod normalizer;
pub mod reader;
pub mod render;
pub mod settings;
pub mod sniffer;

pub use error::{LedgerError, Result};
pub use reader::{extract, read_statement, Extraction, SourceFormat};
pub use settings::Settings;
