use once_cell::sync::Lazy;
use regex::Regex;

use crate::cleaner::{clean_amount, clean_date};
use crate::models::{CanonicalField, NormalizedTable, TypedRow, TypedTable};

static DEBIT_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"debit|débit|withdraw|paid out|money out|\bdr\b").expect("valid regex")
});
static CREDIT_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"credit|crédit|deposit|paid in|money in|\bcr\b").expect("valid regex")
});
static BALANCE_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(balance|bal|solde|saldo)\b").expect("valid regex"));

pub const DESCRIPTION_SEPARATOR: &str = " - ";

fn is_canonical(name: &str) -> bool {
    CanonicalField::from_name(name).is_some()
}

fn first_column_matching(table: &NormalizedTable, pattern: &Regex) -> Option<usize> {
    table
        .columns
        .iter()
        .position(|name| !is_canonical(name) && pattern.is_match(name))
}

fn cleaned_column(table: &NormalizedTable, col: usize) -> Vec<Option<f64>> {
    (0..table.rows.len())
        .map(|row| clean_amount(table.cell(row, col)))
        .collect()
}

/// `credit - debit` per row when both a debit-like and a credit-like
/// column exist; a missing side counts as zero. One side alone is
/// ambiguous and yields nothing.
pub fn infer_amount(table: &NormalizedTable) -> Option<Vec<Option<f64>>> {
    let debit = first_column_matching(table, &DEBIT_LIKE)?;
    let credit = first_column_matching(table, &CREDIT_LIKE)?;
    if debit == credit {
        return None;
    }
    tracing::debug!(
        debit = %table.columns[debit],
        credit = %table.columns[credit],
        "inferring amount from debit/credit columns"
    );
    let values = (0..table.rows.len())
        .map(|row| {
            let d = clean_amount(table.cell(row, debit)).unwrap_or(0.0);
            let c = clean_amount(table.cell(row, credit)).unwrap_or(0.0);
            Some(c - d)
        })
        .collect();
    Some(values)
}

fn looks_numeric(cell: &str) -> bool {
    let s = cell.trim().trim_start_matches(['$', '€', '£']).replace(',', "");
    s.parse::<f64>().is_ok()
}

fn is_textual_column(table: &NormalizedTable, col: usize) -> bool {
    let name = table.columns[col].as_str();
    if is_canonical(name)
        || DEBIT_LIKE.is_match(name)
        || CREDIT_LIKE.is_match(name)
        || BALANCE_LIKE.is_match(name)
    {
        return false;
    }
    let values: Vec<&str> = (0..table.rows.len())
        .map(|row| table.cell(row, col).trim())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() || values.iter().all(|v| looks_numeric(v)) {
        return false;
    }
    !values.iter().all(|v| clean_date(v).is_some())
}

/// Description from the textual columns: one is used verbatim, several
/// are joined with [`DESCRIPTION_SEPARATOR`] in column order.
pub fn infer_description(table: &NormalizedTable) -> Option<Vec<String>> {
    let cols: Vec<usize> = (0..table.columns.len())
        .filter(|&col| is_textual_column(table, col))
        .collect();
    if cols.is_empty() {
        return None;
    }
    tracing::debug!(
        columns = ?cols.iter().map(|&c| table.columns[c].as_str()).collect::<Vec<_>>(),
        "inferring description"
    );
    let values = (0..table.rows.len())
        .map(|row| {
            cols.iter()
                .map(|&col| table.cell(row, col).trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(DESCRIPTION_SEPARATOR)
        })
        .collect();
    Some(values)
}

/// Cleaned values of the first balance-like column.
pub fn infer_balance(table: &NormalizedTable) -> Option<Vec<Option<f64>>> {
    let col = first_column_matching(table, &BALANCE_LIKE)?;
    tracing::debug!(column = %table.columns[col], "inferring balance");
    Some(cleaned_column(table, col))
}

// ---------------------------------------------------------------------------
// Typed rows: each inference is independent, and one that cannot be made
// leaves its field absent
// ---------------------------------------------------------------------------

/// Clean every row and fill absent canonical fields where possible.
pub fn type_rows(table: &NormalizedTable) -> TypedTable {
    let n = table.rows.len();

    let dates: Vec<_> = match table.position(CanonicalField::Date) {
        Some(col) => (0..n).map(|row| clean_date(table.cell(row, col))).collect(),
        None => vec![None; n],
    };
    let amounts = match table.position(CanonicalField::Amount) {
        Some(col) => cleaned_column(table, col),
        None => infer_amount(table).unwrap_or_else(|| vec![None; n]),
    };
    let descriptions = match table.position(CanonicalField::Description) {
        Some(col) => (0..n)
            .map(|row| table.cell(row, col).trim().to_string())
            .collect(),
        None => infer_description(table).unwrap_or_else(|| vec![String::new(); n]),
    };
    let balances = match table.position(CanonicalField::Balance) {
        Some(col) => Some(cleaned_column(table, col)),
        None => infer_balance(table),
    };
    let has_balance = balances.is_some();
    let balances = balances.unwrap_or_else(|| vec![None; n]);

    let rows = (0..n)
        .map(|row| {
            let extra = table
                .columns
                .iter()
                .enumerate()
                .filter(|(_, name)| !is_canonical(name))
                .map(|(col, name)| (name.clone(), table.cell(row, col).trim().to_string()))
                .filter(|(_, value)| !value.is_empty())
                .collect();
            let raw = table.rows[row]
                .iter()
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
                .collect();
            TypedRow {
                date: dates[row],
                description: descriptions[row].clone(),
                amount: amounts[row],
                balance: balances[row],
                extra,
                raw,
            }
        })
        .collect();

    TypedTable { rows, has_balance }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(columns: &[&str], rows: &[&[&str]]) -> NormalizedTable {
        NormalizedTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            source_header: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_amount_is_credit_minus_debit() {
        let t = table(
            &["date", "description", "debit", "credit"],
            &[
                &["2024-01-05", "Coffee", "4.50", ""],
                &["2024-01-06", "Refund", "", "10.00"],
                &["2024-01-07", "Both", "1.00", "3.00"],
                &["2024-01-08", "Neither", "", ""],
            ],
        );
        let typed = type_rows(&t);
        let amounts: Vec<_> = typed.rows.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![Some(-4.5), Some(10.0), Some(2.0), Some(0.0)]);
    }

    #[test]
    fn test_one_sided_debit_is_not_inferred() {
        let t = table(&["date", "description", "debit"], &[&["2024-01-05", "Coffee", "4.50"]]);
        assert!(infer_amount(&t).is_none());
        assert_eq!(type_rows(&t).rows[0].amount, None);
    }

    #[test]
    fn test_existing_amount_is_not_overridden() {
        let t = table(
            &["amount", "debit", "credit"],
            &[&["7.00", "1.00", "2.00"]],
        );
        assert_eq!(type_rows(&t).rows[0].amount, Some(7.0));
    }

    #[test]
    fn test_unparseable_cells_become_absent() {
        let t = table(
            &["date", "description", "amount", "balance"],
            &[&["not a date", "Fee", "N/A", "abc"]],
        );
        let row = &type_rows(&t).rows[0];
        assert_eq!(row.date, None);
        assert_eq!(row.amount, None);
        assert_eq!(row.balance, None);
        assert_eq!(row.description, "Fee");
    }

    #[test]
    fn test_single_textual_column_becomes_description() {
        let t = table(
            &["date", "payee ref", "amount"],
            &[&["2024-01-05", "ACME CORP", "10"]],
        );
        assert_eq!(type_rows(&t).rows[0].description, "ACME CORP");
    }

    #[test]
    fn test_multiple_textual_columns_are_joined_in_order() {
        let t = table(
            &["date", "category", "amount", "merchant name", "code"],
            &[
                &["2024-01-05", "Food", "-4.5", "Blue Bottle", "1001"],
                &["2024-01-06", "", "-2.0", "Corner Shop", "1002"],
            ],
        );
        let typed = type_rows(&t);
        assert_eq!(typed.rows[0].description, "Food - Blue Bottle");
        assert_eq!(typed.rows[1].description, "Corner Shop");
    }

    #[test]
    fn test_date_like_text_column_is_not_description() {
        let t = table(
            &["date", "settled on", "amount"],
            &[&["2024-01-05", "01/07/2024", "1"]],
        );
        assert!(infer_description(&t).is_none());
    }

    #[test]
    fn test_balance_inferred_from_passthrough_column() {
        let t = table(
            &["date", "amount", "bal eur"],
            &[&["2024-01-05", "1", "1.234,50"]],
        );
        let typed = type_rows(&t);
        assert!(typed.has_balance);
        assert_eq!(typed.rows[0].balance, Some(1234.5));
    }

    #[test]
    fn test_extra_and_raw_cells_are_kept() {
        let t = table(
            &["date", "amount", "category"],
            &[&["2024-01-05", " 3 ", "Travel"]],
        );
        let row = &type_rows(&t).rows[0];
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(row.extra, vec![("category".to_string(), "Travel".to_string())]);
        assert_eq!(row.raw, vec!["2024-01-05", "3", "Travel"]);
    }
}
