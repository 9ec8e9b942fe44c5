/// Shortest round-trip form of a float in fixed notation, always with a
/// fractional part: `10.0`, `-4.5`, `1234.56`.
pub fn number(val: f64) -> String {
    let s = val.to_string();
    if val.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

/// Human name for a delimiter byte.
pub fn delimiter_name(delimiter: u8) -> &'static str {
    match delimiter {
        b',' => "comma",
        b';' => "semicolon",
        b'\t' => "tab",
        b'|' => "pipe",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(10.0), "10.0");
        assert_eq!(number(-4.5), "-4.5");
        assert_eq!(number(1234.56), "1234.56");
        assert_eq!(number(0.0), "0.0");
        assert_eq!(number(1e16), "10000000000000000.0");
        assert_eq!(number(0.0000001), "0.0000001");
    }

    #[test]
    fn test_delimiter_name() {
        assert_eq!(delimiter_name(b'\t'), "tab");
        assert_eq!(delimiter_name(b';'), "semicolon");
        assert_eq!(delimiter_name(b':'), "other");
    }
}
