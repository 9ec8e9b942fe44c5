use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Candidate delimiters, in tie-break order.
pub const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Tokens that mark a statement header line.
pub const HEADER_TOKENS: &[&str] = &[
    "date",
    "transaction",
    "description",
    "amount",
    "debit",
    "credit",
    "balance",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub delimiter: u8,
    pub header_row: usize,
}

impl Default for Sniffed {
    fn default() -> Self {
        Self {
            delimiter: b',',
            header_row: 0,
        }
    }
}

/// Read at most `max_lines` physical lines from the head of the file.
pub fn read_sample(file_path: &Path, max_lines: usize) -> Result<Vec<u8>> {
    let file = std::fs::File::open(file_path)?;
    let mut reader = BufReader::new(file);
    let mut sample = Vec::new();
    for _ in 0..max_lines {
        let n = reader.read_until(b'\n', &mut sample)?;
        if n == 0 {
            break;
        }
    }
    Ok(sample)
}

/// Sniff the delimiter and header row. Undecodable bytes become U+FFFD.
pub fn sniff(sample: &[u8], max_lines: usize, header_scan_lines: usize) -> Sniffed {
    let text = String::from_utf8_lossy(sample);
    let lines: Vec<&str> = text.lines().take(max_lines).collect();
    Sniffed {
        delimiter: detect_delimiter(&lines),
        header_row: detect_header_row(&lines, header_scan_lines),
    }
}

/// Most frequent candidate across all sampled lines; comma when none occur.
pub fn detect_delimiter(lines: &[&str]) -> u8 {
    let mut best = b',';
    let mut best_count = 0usize;
    for &delim in &DELIMITERS {
        let count: usize = lines
            .iter()
            .map(|line| line.bytes().filter(|b| *b == delim).count())
            .sum();
        if count > best_count {
            best = delim;
            best_count = count;
        }
    }
    best
}

/// Index of the first line containing a header token, else 0.
pub fn detect_header_row(lines: &[&str], scan: usize) -> usize {
    lines
        .iter()
        .take(scan)
        .position(|line| {
            let lower = line.to_lowercase();
            HEADER_TOKENS.iter().any(|tok| lower.contains(tok))
        })
        .unwrap_or(0)
}
