use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::record::Review;

const HEADER: &str = "id,review_date,author,author_location,rating,review_text,source,bank_response";

/// Serialize a filtered record set as CSV with a header row. Null fields
/// become empty cells.
pub fn to_csv(rows: &[Review]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            row.id,
            csv_escape(row.review_date.as_deref().unwrap_or("")),
            csv_escape(row.author.as_deref().unwrap_or("")),
            csv_escape(row.author_location.as_deref().unwrap_or("")),
            row.rating.map_or(String::new(), |r| r.to_string()),
            csv_escape(row.review_text.as_deref().unwrap_or("")),
            csv_escape(row.source.as_deref().unwrap_or("")),
            csv_escape(row.bank_response.as_deref().unwrap_or("")),
        ));
    }
    out
}

/// Export filename embedding the export timestamp.
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("reviews_export_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Write the record set as a UTF-8 CSV file under `dir`, returning the
/// path written.
pub fn write_csv(rows: &[Review], dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let path = dir.join(export_filename(now));
    std::fs::write(&path, to_csv(rows).as_bytes())?;
    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(path)
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn review(id: i64, date: &str, rating: Option<i32>, source: Option<&str>) -> Review {
        Review {
            id,
            review_date: Some(date.to_string()),
            rating,
            source: source.map(String::from),
            ..Default::default()
        }
    }

    /// Minimal RFC-4180 row parser, for round-trip assertions only.
    fn parse_row(line: &str) -> Vec<String> {
        let mut cells = Vec::new();
        let mut cell = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => {
                    cells.push(std::mem::take(&mut cell));
                }
                _ => cell.push(c),
            }
        }
        cells.push(cell);
        cells
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("hello"), "hello");
        assert_eq!(csv_escape("hello,world"), "\"hello,world\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_header_and_empty_set() {
        let csv = to_csv(&[]);
        assert_eq!(csv, format!("{HEADER}\n"));
    }

    #[test]
    fn test_export_filename() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 9)
            .unwrap();
        assert_eq!(export_filename(now), "reviews_export_20250315_143009.csv");
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let rows = vec![
            review(1, "2025-03-15 10:00:00", Some(5), Some("app")),
            review(2, "2025-03-16 11:00:00", None, Some("web, mobile")),
            Review {
                id: 3,
                review_date: Some("2025-03-17".to_string()),
                review_text: Some("line one\"quoted\"".to_string()),
                rating: Some(1),
                ..Default::default()
            },
        ];
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), rows.len() + 1);
        assert_eq!(lines[0], HEADER);

        for (line, row) in lines[1..].iter().zip(&rows) {
            let cells = parse_row(line);
            assert_eq!(cells.len(), 8);
            assert_eq!(cells[0], row.id.to_string());
            assert_eq!(cells[1], row.review_date.clone().unwrap_or_default());
            assert_eq!(cells[4], row.rating.map_or(String::new(), |r| r.to_string()));
            assert_eq!(cells[6], row.source.clone().unwrap_or_default());
        }
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let now = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let rows = vec![review(1, "2025-01-01", Some(4), Some("app"))];
        let path = write_csv(&rows, dir.path(), now).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "reviews_export_20250102_030405.csv"
        );
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(HEADER));
        assert!(contents.contains("2025-01-01"));
    }
}
