use chrono::NaiveDate;
use serde::Serialize;

/// Scalar summary metrics over one filtered record set.
///
/// Every percentage uses `total_reviews` as the denominator, including
/// rows with no rating, and substitutes 0 when the set is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewMetrics {
    pub total_reviews: u64,
    /// Mean of present ratings; 0 when none are present.
    pub avg_rating: f64,
    /// Percentage of reviews rated 4 or 5.
    pub positive_pct: f64,
    /// Percentage of reviews with a non-empty institution reply.
    pub response_rate: f64,
    /// Distinct non-null author names.
    pub unique_authors: u64,
    /// Rating-threshold proxy: pct(rating >= 4) minus pct(rating <= 2).
    /// Not a true NPS (that needs a 0-10 scale); kept as-is because
    /// downstream consumers already expect this value.
    pub nps_like: f64,
}

/// One day of the daily time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub count: u64,
    pub avg_rating: f64,
}

/// Count of reviews for one source channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}

/// Count of reviews for one rating value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingCount {
    pub rating: i32,
    pub count: u64,
}
