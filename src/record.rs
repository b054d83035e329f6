use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::date_util::parse_review_date;

/// One customer review row as returned by the store.
///
/// Every column except `id` is optional: the hosted table schema has
/// drifted over time and older deployments are missing whole columns.
/// Deserialization tolerates any of them being absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: i64,
    pub review_date: Option<String>,
    pub author: Option<String>,
    pub author_location: Option<String>,
    pub rating: Option<i32>,
    pub review_text: Option<String>,
    pub source: Option<String>,
    pub bank_response: Option<String>,
}

impl Review {
    /// The review timestamp, if the raw value parses.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.review_date.as_deref().and_then(parse_review_date)
    }

    /// The calendar-date portion of the review timestamp.
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.date())
    }

    /// Whether the institution replied. Null or empty means no response.
    pub fn has_response(&self) -> bool {
        self.bank_response
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_row() {
        let json = r#"{
            "id": 42,
            "review_date": "2025-03-15T14:30:09",
            "author": "Ivan",
            "author_location": "Moscow",
            "rating": 4,
            "review_text": "Fine.",
            "source": "app",
            "bank_response": "Thank you"
        }"#;
        let r: Review = serde_json::from_str(json).unwrap();
        assert_eq!(r.id, 42);
        assert_eq!(r.rating, Some(4));
        assert_eq!(r.source.as_deref(), Some("app"));
        assert!(r.has_response());
        assert_eq!(
            r.date(),
            Some(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap())
        );
    }

    #[test]
    fn test_deserialize_missing_columns() {
        // Older deployments have no bank_response or author_location columns
        let json = r#"{"id": 7, "review_date": "2025-01-01", "rating": 5}"#;
        let r: Review = serde_json::from_str(json).unwrap();
        assert_eq!(r.id, 7);
        assert!(r.author.is_none());
        assert!(r.source.is_none());
        assert!(!r.has_response());
    }

    #[test]
    fn test_has_response_empty_string() {
        let r = Review {
            bank_response: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!r.has_response());
    }

    #[test]
    fn test_timestamp_unparseable() {
        let r = Review {
            review_date: Some("garbage".to_string()),
            ..Default::default()
        };
        assert!(r.timestamp().is_none());
        assert!(r.date().is_none());
    }
}
