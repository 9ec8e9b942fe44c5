use std::borrow::Cow;
use std::fmt;

use crate::models::RawTable;
use crate::sniffer::Sniffed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// UTF-8, normal quoting, malformed rows kept with a warning.
    Tolerant,
    /// Windows-1252 text, normal quoting, malformed rows skipped.
    LegacyEncoding,
    /// Quotes are literal text, malformed rows skipped.
    QuoteAgnostic,
}

// ---------------------------------------------------------------------------
// Delimited text: each tier yields a table or a TierFailure, and only a
// failure moves on to the next tier
// ---------------------------------------------------------------------------

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Tolerant, Tier::LegacyEncoding, Tier::QuoteAgnostic];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tolerant => "tolerant",
            Self::LegacyEncoding => "legacy-encoding",
            Self::QuoteAgnostic => "quote-agnostic",
        }
    }

    fn quoting(&self) -> bool {
        !matches!(self, Self::QuoteAgnostic)
    }

    fn keeps_malformed(&self) -> bool {
        matches!(self, Self::Tolerant)
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, TierFailure> {
        let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
        match self {
            Self::Tolerant => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| TierFailure::Undecodable {
                    offset: e.valid_up_to(),
                }),
            Self::LegacyEncoding => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0),
            // Bytes that are valid UTF-8 stay UTF-8 here; the quote
            // problem that got us this far is not an encoding one.
            Self::QuoteAgnostic => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(Cow::Borrowed(text)),
                Err(_) => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0),
            },
        }
    }

    /// Parse `bytes` under this tier's rules, starting at the sniffed
    /// header row.
    pub fn parse(&self, bytes: &[u8], sniffed: Sniffed) -> Result<RawTable, TierFailure> {
        let text = self.decode(bytes)?;
        let body = skip_lines(&text, sniffed.header_row);

        if self.quoting() {
            if let Some(line) = unterminated_quote(body, sniffed.delimiter) {
                return Err(TierFailure::UnterminatedQuote {
                    line: line + sniffed.header_row,
                });
            }
        }

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(sniffed.delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(self.quoting())
            .from_reader(body.as_bytes());

        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| TierFailure::Parse(e.to_string()))?;
            let cells: Vec<String> = record.iter().map(str::to_string).collect();
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            let Some(width) = header.as_ref().map(Vec::len) else {
                header = Some(cells);
                continue;
            };
            let line = record.position().map_or(0, |p| p.line() as usize) + sniffed.header_row;
            // A stray quote closed by a later quoted field folds the rows
            // between them into one record of the wrong width.
            if self.quoting() && cells.len() != width && cells.iter().any(|c| c.contains('\n')) {
                return Err(TierFailure::SpannedRecord { line });
            }
            if cells.len() > width {
                if self.keeps_malformed() {
                    tracing::warn!(
                        line,
                        expected = width,
                        found = cells.len(),
                        "malformed row kept as parsed"
                    );
                } else {
                    tracing::debug!(
                        tier = self.name(),
                        line,
                        expected = width,
                        found = cells.len(),
                        "malformed row skipped"
                    );
                    continue;
                }
            }
            rows.push(cells);
        }

        Ok(RawTable::new(header.unwrap_or_default(), rows))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structural reasons a tier gives up on a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierFailure {
    Undecodable { offset: usize },
    UnterminatedQuote { line: usize },
    SpannedRecord { line: usize },
    Parse(String),
}

impl fmt::Display for TierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undecodable { offset } => write!(f, "invalid UTF-8 at byte {offset}"),
            Self::UnterminatedQuote { line } => {
                write!(f, "quoted field opened at line {line} never closes")
            }
            Self::SpannedRecord { line } => {
                write!(f, "record at line {line} spans several lines with the wrong column count")
            }
            Self::Parse(msg) => f.write_str(msg),
        }
    }
}

/// Every tier failed; one entry per tier, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiersExhausted(pub Vec<(Tier, TierFailure)>);

impl fmt::Display for TiersExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(tier, failure)| format!("{tier}: {failure}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Try each tier in order and return the first table produced.
pub fn load_delimited(bytes: &[u8], sniffed: Sniffed) -> Result<(RawTable, Tier), TiersExhausted> {
    let mut failures = Vec::new();
    for tier in Tier::ALL {
        match tier.parse(bytes, sniffed) {
            Ok(table) => {
                tracing::info!(
                    tier = tier.name(),
                    rows = table.rows.len(),
                    columns = table.width(),
                    "table loaded"
                );
                return Ok((table, tier));
            }
            Err(failure) => {
                tracing::debug!(tier = tier.name(), %failure, "tier failed, escalating");
                failures.push((tier, failure));
            }
        }
    }
    Err(TiersExhausted(failures))
}

fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return "",
        }
    }
    rest
}

/// Line (1-based) of a quoted field still open at end of input. A quote
/// only opens a field at the start of it, matching the csv reader.
fn unterminated_quote(text: &str, delimiter: u8) -> Option<usize> {
    let delim = delimiter as char;
    let mut line = 1;
    let mut opened_at: Option<usize> = None;
    let mut field_start = true;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        if opened_at.is_some() {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    opened_at = None;
                }
            }
            continue;
        }
        if c == '"' && field_start {
            opened_at = Some(line);
        }
        field_start = c == delim || c == '\n' || c == '\r';
    }
    opened_at
}

// ---------------------------------------------------------------------------
// Spreadsheets: first sheet, first non-empty row as header, no tiering
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
mod spreadsheet {
    use std::path::Path;

    use calamine::{Data, Range, Reader};

    use crate::cleaner::excel_serial_to_date;
    use crate::error::{LedgerError, Result};
    use crate::models::RawTable;

    pub(super) fn cell_text(cell: &Data) -> String {
        match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Float(f) => f.to_string(),
            Data::Int(i) => i.to_string(),
            Data::Bool(b) => b.to_string(),
            Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            _ => String::new(),
        }
    }

    pub(super) fn table_from_range(range: &Range<Data>) -> RawTable {
        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|c| !c.is_empty()));
        let header = rows.next().unwrap_or_default();
        RawTable::new(header, rows.collect())
    }

    pub fn load_spreadsheet(file_path: &Path) -> Result<RawTable> {
        let mut workbook = calamine::open_workbook_auto(file_path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LedgerError::NoWorksheet(file_path.display().to_string()))??;

        let table = table_from_range(&range);
        tracing::info!(rows = table.rows.len(), columns = table.width(), "worksheet loaded");
        Ok(table)
    }
}

#[cfg(feature = "xlsx")]
pub use spreadsheet::load_spreadsheet;
