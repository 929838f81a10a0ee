use chrono::NaiveDate;

/// Parse `"YYYY-MM-DD"` or `"YYYY/MM/DD"`, ignoring a trailing `T...` or ` ...` time part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10)?;
    match s.as_bytes().get(10).copied() {
        None | Some(b'T') | Some(b' ') => {}
        _ => return None,
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%Y/%m/%d"))
        .ok()
}
