use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Get midnight at the start of the given day.
pub fn start_of_day(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_hms_opt(0, 0, 0).unwrap()
}

/// Get midnight on the most recent Monday (or today, if today is Monday).
pub fn start_of_week(ts: NaiveDateTime) -> NaiveDateTime {
    let days_back = ts.date().weekday().num_days_from_monday() as i64;
    (ts.date() - Duration::days(days_back))
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Get midnight on the first day of the month.
pub fn start_of_month(ts: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(ts.year(), ts.month(), 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Parse a review timestamp leniently. The store returns RFC 3339 strings,
/// but older rows use space-separated datetimes or bare dates.
pub fn parse_review_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_start_of_day() {
        assert_eq!(start_of_day(ts(2025, 3, 15, 14, 30, 9)), ts(2025, 3, 15, 0, 0, 0));
        assert_eq!(start_of_day(ts(2025, 3, 15, 0, 0, 0)), ts(2025, 3, 15, 0, 0, 0));
    }

    #[test]
    fn test_start_of_week() {
        // 2025-03-15 is a Saturday; the preceding Monday is 2025-03-10
        assert_eq!(start_of_week(ts(2025, 3, 15, 10, 0, 0)), ts(2025, 3, 10, 0, 0, 0));
        // A Monday maps to itself at midnight
        assert_eq!(start_of_week(ts(2025, 3, 10, 23, 59, 59)), ts(2025, 3, 10, 0, 0, 0));
        assert_eq!(start_of_week(ts(2025, 3, 16, 1, 0, 0)), ts(2025, 3, 10, 0, 0, 0)); // Sunday
    }

    #[test]
    fn test_start_of_month() {
        assert_eq!(start_of_month(ts(2025, 12, 31, 23, 0, 0)), ts(2025, 12, 1, 0, 0, 0));
        assert_eq!(start_of_month(ts(2024, 2, 29, 5, 0, 0)), ts(2024, 2, 1, 0, 0, 0));
    }

    #[test]
    fn test_parse_review_date_rfc3339() {
        assert_eq!(
            parse_review_date("2025-03-15T14:30:09+00:00"),
            Some(ts(2025, 3, 15, 14, 30, 9))
        );
        assert_eq!(
            parse_review_date("2025-03-15T14:30:09Z"),
            Some(ts(2025, 3, 15, 14, 30, 9))
        );
    }

    #[test]
    fn test_parse_review_date_naive() {
        assert_eq!(
            parse_review_date("2025-03-15T14:30:09"),
            Some(ts(2025, 3, 15, 14, 30, 9))
        );
        assert_eq!(
            parse_review_date("2025-03-15 14:30:09"),
            Some(ts(2025, 3, 15, 14, 30, 9))
        );
        assert_eq!(
            parse_review_date("2025-03-15 14:30:09.123"),
            Some(ts(2025, 3, 15, 14, 30, 9) + chrono::Duration::milliseconds(123))
        );
    }

    #[test]
    fn test_parse_review_date_bare_date() {
        assert_eq!(parse_review_date("2025-03-15"), Some(ts(2025, 3, 15, 0, 0, 0)));
    }

    #[test]
    fn test_parse_review_date_invalid() {
        assert_eq!(parse_review_date(""), None);
        assert_eq!(parse_review_date("   "), None);
        assert_eq!(parse_review_date("not-a-date"), None);
        assert_eq!(parse_review_date("15/03/2025"), None);
    }
}
