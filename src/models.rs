use chrono::NaiveDate;

/// The fixed target columns every statement layout is normalized toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Date,
    Description,
    Amount,
    Balance,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 4] = [
        CanonicalField::Date,
        CanonicalField::Description,
        CanonicalField::Amount,
        CanonicalField::Balance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Balance => "balance",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Header plus string cells exactly as the loader produced them.
/// Rows may be ragged; missing trailing cells read as empty.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }
}

/// A raw table after column canonicalization. At most one column carries
/// each canonical name; everything else keeps its lower-cased header.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    /// The header as it appeared in the file, kept for previews and reports.
    pub source_header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn position(&self, field: CanonicalField) -> Option<usize> {
        self.column(field.as_str())
    }

    pub fn has(&self, field: CanonicalField) -> bool {
        self.position(field).is_some()
    }

    /// Cell text at `(row, col)`, empty when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

/// One cleaned row. Canonical values are either valid or absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedRow {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: Option<f64>,
    pub balance: Option<f64>,
    /// Uncategorized columns as (name, value), in table order.
    pub extra: Vec<(String, String)>,
    /// Every non-empty raw cell of the row, in table order.
    pub raw: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TypedTable {
    pub rows: Vec<TypedRow>,
    /// True when a balance column exists anywhere in the table.
    pub has_balance: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_field_names_roundtrip() {
        for field in CanonicalField::ALL {
            assert_eq!(CanonicalField::from_name(field.as_str()), Some(field));
        }
        assert_eq!(CanonicalField::from_name("debit"), None);
    }

    #[test]
    fn test_cell_reads_short_rows_as_empty() {
        let table = NormalizedTable {
            columns: vec!["date".into(), "amount".into()],
            source_header: vec!["Date".into(), "Amount".into()],
            rows: vec![vec!["2024-01-05".into()]],
        };
        assert_eq!(table.cell(0, 0), "2024-01-05");
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(5, 0), "");
        assert_eq!(table.position(CanonicalField::Amount), Some(1));
        assert!(!table.has(CanonicalField::Balance));
    }
}
