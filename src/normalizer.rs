use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CanonicalField, NormalizedTable, RawTable};

/// Known header spellings per canonical field.
pub const SYNONYMS: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Date,
        &[
            "date",
            "transaction date",
            "trans date",
            "txn date",
            "posting date",
            "post date",
            "date opération",
            "date operation",
            "fecha",
            "datum",
            "buchungstag",
        ],
    ),
    (
        CanonicalField::Description,
        &[
            "description",
            "desc",
            "memo",
            "details",
            "narrative",
            "narration",
            "particulars",
            "payee",
            "merchant",
            "libellé",
            "libelle",
            "label",
            "concepto",
            "verwendungszweck",
        ],
    ),
    (
        CanonicalField::Amount,
        &[
            "amount",
            "montant",
            "transaction amount",
            "amt",
            "debit amount",
            "crédit",
            "importe",
            "betrag",
            "value",
            "sum",
        ],
    ),
    (
        CanonicalField::Balance,
        &["balance", "solde", "saldo", "running bal.", "running balance"],
    ),
];

static HEURISTICS: Lazy<Vec<(CanonicalField, Regex)>> = Lazy::new(|| {
    let rule = |field, pattern: &str| (field, Regex::new(pattern).expect("valid header pattern"));
    vec![
        rule(CanonicalField::Balance, r"\b(balance|bal|solde|saldo)\b"),
        rule(
            CanonicalField::Amount,
            r"amount|\bamt\b|debit|débit|credit|crédit|withdraw|deposit|montant|betrag|importe",
        ),
        rule(CanonicalField::Date, r"\b(date|datum|fecha)\b"),
        rule(
            CanonicalField::Description,
            r"desc|memo|detail|narrat|particular|payee|merchant|libell|remark|reference",
        ),
    ]
});

/// Variants the primary pass cannot place on its own.
pub const ALIASES: &[(&str, &str)] = &[
    ("value date", "date"),
    ("booking date", "date"),
    ("posted date", "date"),
    ("transaction posted date", "date"),
    ("date de valeur", "date"),
    ("debit", "debit"),
    ("débit", "debit"),
    ("debits", "debit"),
    ("withdrawal", "debit"),
    ("withdrawals", "debit"),
    ("withdrawal amt", "debit"),
    ("withdrawal amount", "debit"),
    ("debit amount", "debit"),
    ("paid out", "debit"),
    ("money out", "debit"),
    ("credit", "credit"),
    ("crédit", "credit"),
    ("credits", "credit"),
    ("deposit", "credit"),
    ("deposits", "credit"),
    ("deposit amt", "credit"),
    ("deposit amount", "credit"),
    ("credit amount", "credit"),
    ("paid in", "credit"),
    ("money in", "credit"),
    ("closing balance", "balance"),
    ("available balance", "balance"),
    ("running balance", "balance"),
    ("ledger balance", "balance"),
];

fn clean_header(raw: &str) -> String {
    raw.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Primary pass for one header cell, first match wins: exact synonym,
/// then balance, amount, date and description patterns, else the trimmed
/// lower-cased header itself. Balance goes first since headers such as
/// "balance amount" match both.
pub fn canonicalize_header(raw: &str) -> String {
    let cell = clean_header(raw);
    for (field, synonyms) in SYNONYMS {
        if synonyms.contains(&cell.as_str()) {
            return field.as_str().to_string();
        }
    }
    for (field, pattern) in HEURISTICS.iter() {
        if pattern.is_match(&cell) {
            return field.as_str().to_string();
        }
    }
    cell
}

fn alias_for<'a>(cell: &str, extra: &'a BTreeMap<String, String>) -> Option<&'a str> {
    if let Some(target) = extra.get(cell) {
        return Some(target.as_str());
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == cell)
        .map(|(_, target)| *target)
}

/// Normalize a full header row. Output has the same length and order.
/// The alias map overrides the primary pass, and only the first column
/// per canonical name keeps it.
pub fn normalize_headers(headers: &[String], extra_aliases: &BTreeMap<String, String>) -> Vec<String> {
    let mapped: Vec<String> = headers
        .iter()
        .map(|raw| {
            let cell = clean_header(raw);
            match alias_for(&cell, extra_aliases) {
                Some(target) => target.to_string(),
                None => canonicalize_header(raw),
            }
        })
        .collect();

    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(mapped.len());
    for (raw, name) in headers.iter().zip(mapped) {
        let name = if used.contains(&name) {
            // Later duplicates fall back to their own header.
            unique_name(clean_header(raw), &used)
        } else {
            name
        };
        used.insert(name.clone());
        out.push(name);
    }
    out
}

fn unique_name(base: String, used: &HashSet<String>) -> String {
    if !used.contains(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{base}.{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(base)
}

pub fn normalize_table(raw: RawTable, extra_aliases: &BTreeMap<String, String>) -> NormalizedTable {
    let columns = normalize_headers(&raw.header, extra_aliases);
    tracing::info!(
        columns = ?columns,
        "normalized {} header cells",
        columns.len()
    );
    NormalizedTable {
        columns,
        source_header: raw.header,
        rows: raw.rows,
    }
}
