use std::path::Path;

use crate::error::{LedgerError, Result};
use crate::finance::{self, FinanceGuess};
use crate::inference::type_rows;
use crate::loader::{load_delimited, Tier};
use crate::models::RawTable;
use crate::normalizer::normalize_table;
use crate::render::render;
use crate::settings::Settings;
use crate::sniffer::{read_sample, sniff, Sniffed};

// ---------------------------------------------------------------------------
// Source formats: enum dispatch, the only place a format meets its loader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    #[cfg(feature = "xlsx")]
    Xls,
    #[cfg(feature = "xlsx")]
    Xlsx,
}

const ALL_FORMATS: &[SourceFormat] = &[
    SourceFormat::Csv,
    #[cfg(feature = "xlsx")]
    SourceFormat::Xls,
    #[cfg(feature = "xlsx")]
    SourceFormat::Xlsx,
];

struct Loaded {
    table: RawTable,
    sniffed: Option<Sniffed>,
    tier: Option<Tier>,
}

impl SourceFormat {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            #[cfg(feature = "xlsx")]
            Self::Xls => "xls",
            #[cfg(feature = "xlsx")]
            Self::Xlsx => "xlsx",
        }
    }

    /// Accepts `csv`, `.CSV`, ` xlsx ` and the like.
    pub fn from_declared(declared: &str) -> Option<Self> {
        let key = declared.trim().trim_start_matches('.').to_lowercase();
        ALL_FORMATS.iter().find(|f| f.key() == key).copied()
    }

    /// The declared type when given, else the path extension.
    pub fn for_file(file_path: &Path, declared: Option<&str>) -> Result<Self> {
        if file_path.as_os_str().is_empty() {
            return Err(LedgerError::EmptyPath);
        }
        let key = match declared {
            Some(d) => d.to_string(),
            None => file_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string(),
        };
        Self::from_declared(&key).ok_or(LedgerError::UnsupportedFormat(key))
    }

    fn load(&self, file_path: &Path, settings: &Settings) -> Result<Loaded> {
        match self {
            Self::Csv => load_csv(file_path, settings),
            #[cfg(feature = "xlsx")]
            Self::Xls | Self::Xlsx => Ok(Loaded {
                table: crate::loader::load_spreadsheet(file_path)?,
                sniffed: None,
                tier: None,
            }),
        }
    }
}

fn load_csv(file_path: &Path, settings: &Settings) -> Result<Loaded> {
    let sample = read_sample(file_path, settings.sample_lines)?;
    let sniffed = sniff(&sample, settings.sample_lines, settings.header_scan_lines);
    tracing::info!(
        delimiter = %(sniffed.delimiter as char).escape_default(),
        header_row = sniffed.header_row,
        "sniffed {}",
        file_path.display()
    );

    let bytes = std::fs::read(file_path)?;
    let (table, tier) = load_delimited(&bytes, sniffed).map_err(|e| LedgerError::Unreadable {
        path: file_path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(Loaded {
        table,
        sniffed: Some(sniffed),
        tier: Some(tier),
    })
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Extraction {
    pub format: SourceFormat,
    /// Delimiter and header row; spreadsheets are not sniffed.
    pub sniffed: Option<Sniffed>,
    pub tier: Option<Tier>,
    /// (header as found, normalized name) per column.
    pub columns: Vec<(String, String)>,
    pub rows: usize,
    pub used_preview: bool,
    pub truncated: bool,
    pub finance: FinanceGuess,
    pub text: String,
}

fn truncate_chars(text: &mut String, max_chars: usize) -> bool {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            text.truncate(idx);
            true
        }
        None => false,
    }
}

/// Run one file through sniffing, loading, normalization, cleaning,
/// inference and rendering.
pub fn extract(file_path: &Path, declared: Option<&str>, settings: &Settings) -> Result<Extraction> {
    let format = SourceFormat::for_file(file_path, declared)?;
    let loaded = format.load(file_path, settings)?;

    let table = normalize_table(loaded.table, &settings.header_aliases);
    let typed = type_rows(&table);
    let delimiter = loaded.sniffed.map_or(b',', |s| s.delimiter);
    let rendered = render(&table, &typed, delimiter, settings.preview_rows);

    let mut text = rendered.text;
    let truncated = truncate_chars(&mut text, settings.max_chars);
    let finance = finance::detect(&text);
    let columns = table
        .source_header
        .iter()
        .cloned()
        .zip(table.columns.iter().cloned())
        .collect();

    Ok(Extraction {
        format,
        sniffed: loaded.sniffed,
        tier: loaded.tier,
        columns,
        rows: rendered.lines,
        used_preview: rendered.used_preview,
        truncated,
        finance,
        text,
    })
}

/// The text blob for one statement file.
pub fn read_statement(file_path: &Path, declared: Option<&str>, settings: &Settings) -> Result<String> {
    extract(file_path, declared, settings).map(|e| e.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::Kind;

    fn write(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_from_declared_normalizes() {
        assert_eq!(SourceFormat::from_declared(".CSV"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_declared(" csv "), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_declared("pdf"), None);
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_spreadsheet_extensions_dispatch() {
        let f = SourceFormat::for_file(Path::new("stmt.XLSX"), None).unwrap();
        assert_eq!(f, SourceFormat::Xlsx);
        let f = SourceFormat::for_file(Path::new("stmt.xls"), None).unwrap();
        assert_eq!(f, SourceFormat::Xls);
    }

    #[test]
    fn test_unsupported_extension_fails_before_reading() {
        // The file does not exist; the extension check must come first.
        let err = extract(Path::new("/nonexistent/report.pdf"), None, &Settings::default())
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnsupportedFormat(ref e) if e == "pdf"));
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let err = SourceFormat::for_file(Path::new(""), None).unwrap_err();
        assert!(matches!(err, LedgerError::EmptyPath));
    }

    #[test]
    fn test_debit_credit_statement_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "stmt.csv",
            b"Txn Date,Memo,Debit,Credit\n2024-01-05,Coffee,4.50,\n2024-01-06,Refund,,10.00\n",
        );
        let text = read_statement(&path, None, &Settings::default()).unwrap();
        assert_eq!(text, "2024-01-05 | Coffee | -4.5\n2024-01-06 | Refund | 10.0");
    }

    #[test]
    fn test_preamble_and_balance_statement() {
        let dir = tempfile::tempdir().unwrap();
        let content = "\
Account Name: Test Checking
Account Number: ****1234

Date,Description,Amount,Running Bal.
01/15/2025,ADOBE CREATIVE,-50.00,950.00
01/17/2025,STRIPE PAYOUT,\"2,500.00\",\"3,450.00\"
";
        let path = write(dir.path(), "bofa.csv", content.as_bytes());
        let extraction = extract(&path, None, &Settings::default()).unwrap();
        assert_eq!(extraction.sniffed.unwrap().header_row, 3);
        assert_eq!(extraction.tier, Some(Tier::Tolerant));
        assert_eq!(
            extraction.text,
            "2025-01-15 | ADOBE CREATIVE | -50.0 | 950.0\n2025-01-17 | STRIPE PAYOUT | 2500.0 | 3450.0"
        );
        assert_eq!(extraction.rows, 2);
    }

    #[test]
    fn test_semicolon_european_statement() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "releve.txt",
            "Date;Libellé;Montant;Solde\n13/01/2025;Boulangerie;-4,50;1.234,56\n".as_bytes(),
        );
        let text = read_statement(&path, Some("csv"), &Settings::default()).unwrap();
        assert_eq!(text, "2025-01-13 | Boulangerie | -4.5 | 1234.56");
    }

    #[test]
    fn test_header_only_file_yields_preview_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", b"Date,Description,Amount\n");
        let extraction = extract(&path, None, &Settings::default()).unwrap();
        assert!(extraction.used_preview);
        assert!(extraction.text.starts_with("No rows parsed"));
        assert!(extraction.text.contains("Date,Description,Amount"));
    }

    #[test]
    fn test_unmatched_quote_keeps_other_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "bad.csv",
            b"Date,Description,Amount\n2024-01-05,\"Coffee,-4.50\n2024-01-06,Tea,-3.00\n2024-01-07,Cake,-5.00\n",
        );
        let extraction = extract(&path, None, &Settings::default()).unwrap();
        assert_eq!(extraction.tier, Some(Tier::QuoteAgnostic));
        assert!(extraction.text.contains("2024-01-06 | Tea | -3.0"));
        assert!(extraction.text.contains("2024-01-07 | Cake | -5.0"));
    }

    #[test]
    fn test_stray_quote_does_not_swallow_later_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "stray.csv",
            b"Date,Description,Amount\n2024-01-05,\"Coffee,-4.50\n2024-01-06,Tea,-3.00\n2024-01-07,Cake,\"5.00\"\n2024-01-08,Bread,-2.00\n",
        );
        let extraction = extract(&path, None, &Settings::default()).unwrap();
        assert_eq!(extraction.tier, Some(Tier::QuoteAgnostic));
        assert!(extraction.text.contains("2024-01-06 | Tea | -3.0"));
        assert!(extraction.text.contains("2024-01-07 | Cake | 5.0"));
        assert!(extraction.text.contains("2024-01-08 | Bread | -2.0"));
        assert_eq!(extraction.rows, 4);
    }

    #[test]
    fn test_rows_without_canonical_data_use_raw_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "codes.csv", b"Code,Other\n17,991\n");
        let text = read_statement(&path, None, &Settings::default()).unwrap();
        assert_eq!(text, "17 | 991");
    }

    #[test]
    fn test_invoice_export_is_guessed_as_finance() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "inv.csv",
            b"Date,Description,Amount\n2024-01-05,Invoice 991 payment,120.00\n2024-01-06,Account credit,-20.00\n",
        );
        let extraction = extract(&path, None, &Settings::default()).unwrap();
        assert_eq!(extraction.finance.kind, Kind::Finance);
        assert_eq!(extraction.format, SourceFormat::Csv);
        assert_eq!(
            extraction.columns[0],
            ("Date".to_string(), "date".to_string())
        );
    }

    #[test]
    fn test_output_is_truncated_to_max_chars() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::from("date,description,amount\n");
        for i in 0..100 {
            content.push_str(&format!("2024-01-05,Item {i},1.00\n"));
        }
        let path = write(dir.path(), "long.csv", content.as_bytes());
        let settings = Settings {
            max_chars: 50,
            ..Settings::default()
        };
        let extraction = extract(&path, None, &settings).unwrap();
        assert!(extraction.truncated);
        assert_eq!(extraction.text.chars().count(), 50);
    }

    #[test]
    fn test_missing_csv_is_io_error() {
        let err = read_statement(Path::new("/nonexistent/stmt.csv"), None, &Settings::default())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
