/// Tokens treated as a missing value, compared case-insensitively.
const MISSING_TOKENS: &[&str] = &["nan", "na", "n/a", "null"];

/// Parse a numeric field. Empty and missing markers give `Ok(None)`;
/// anything else that is not a finite number is an error.
pub fn parse_optional_f64(raw: &str) -> Result<Option<f64>, &'static str> {
    let s = raw.trim();
    if s.is_empty() || MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Err("non-finite number"),
        Err(_) => Err("not a number"),
    }
}

/// Shortest representation that parses back to the same `f64`; missing is empty.
pub fn format_optional_f64(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}
