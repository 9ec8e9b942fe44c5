use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static THOUSANDS_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[1-9]\d{0,2}(,\d{3})+$").expect("valid regex"));
static THOUSANDS_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[1-9]\d{0,2}(\.\d{3}){2,}$").expect("valid regex"));
static YMD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$").expect("valid regex"));
static MDY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})$").expect("valid regex"));
static COMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("valid regex"));
static TIME_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)[T ]\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?\s*([AaPp][Mm])?\s*(Z|[+-]\d{2}:?\d{2})?$")
        .expect("valid regex")
});

const NAMED_MONTH_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d %B, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d-%B-%Y",
    "%d-%B-%y",
    "%d/%B/%Y",
    "%d.%B.%Y",
];

// Cleaning never fails: a bad cell becomes `None` and the read goes on.

/// Parse a statement amount.
///
/// Currency symbols, letters and spaces are dropped. `(12.50)` and a
/// trailing minus (`12.50-`) are negative. When both `,` and `.` appear,
/// the right-most one is the decimal point; a lone `,` is a decimal comma
/// unless it groups thousands (`1,234`).
pub fn clean_amount(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '(' | ')'))
        .collect();

    let mut body = kept.as_str();
    let mut negative = false;
    if let Some(inner) = body.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        negative = true;
        body = inner;
    }
    if body.len() > 1 {
        if let Some(inner) = body.strip_suffix('-') {
            negative = !negative;
            body = inner;
        }
    }
    if !body.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    let value: f64 = normalize_separators(body).parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn normalize_separators(s: &str) -> String {
    match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) if THOUSANDS_COMMA.is_match(s) => s.replace(',', ""),
        (None, Some(_)) => s.replace(',', "."),
        (Some(_), None) if THOUSANDS_DOT.is_match(s) => s.replace('.', ""),
        _ => s.to_string(),
    }
}

/// Parse a statement date, preferring month-first for ambiguous numeric
/// forms and swapping to day-first when month-first is impossible.
pub fn clean_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(c) = YMD.captures(s).or_else(|| COMPACT.captures(s)) {
        let y: i32 = c[1].parse().ok()?;
        let m: u32 = c[2].parse().ok()?;
        let d: u32 = c[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    if let Some(c) = MDY.captures(s) {
        let a: u32 = c[1].parse().ok()?;
        let b: u32 = c[2].parse().ok()?;
        let mut y: i32 = c[3].parse().ok()?;
        if c[3].len() == 2 {
            y += if y < 69 { 2000 } else { 1900 };
        }
        return NaiveDate::from_ymd_opt(y, a, b).or_else(|| NaiveDate::from_ymd_opt(y, b, a));
    }

    for fmt in NAMED_MONTH_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    if let Some(c) = TIME_SUFFIX.captures(s) {
        return clean_date(&c[1]);
    }
    None
}

/// Convert an Excel serial day number (1899-12-30 epoch, which absorbs
/// the 1900 leap-year bug) to a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::try_days(serial.trunc() as i64)?)
}
