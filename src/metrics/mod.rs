pub mod types;

pub use types::*;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::record::Review;

impl ReviewMetrics {
    /// Compute scalar metrics over a filtered record set.
    pub fn compute(rows: &[Review]) -> Self {
        let total = rows.len() as u64;
        if total == 0 {
            return Self::default();
        }

        let mut rating_sum: i64 = 0;
        let mut rated: u64 = 0;
        let mut promoters: u64 = 0;
        let mut detractors: u64 = 0;
        let mut responded: u64 = 0;
        let mut authors: HashSet<&str> = HashSet::new();

        for r in rows {
            if let Some(rating) = r.rating {
                rating_sum += rating as i64;
                rated += 1;
                if rating >= 4 {
                    promoters += 1;
                }
                if rating <= 2 {
                    detractors += 1;
                }
            }
            if r.has_response() {
                responded += 1;
            }
            if let Some(author) = r.author.as_deref() {
                authors.insert(author);
            }
        }

        let avg_rating = if rated > 0 {
            rating_sum as f64 / rated as f64
        } else {
            0.0
        };

        Self {
            total_reviews: total,
            avg_rating,
            positive_pct: promoters as f64 / total as f64 * 100.0,
            response_rate: responded as f64 / total as f64 * 100.0,
            unique_authors: authors.len() as u64,
            nps_like: (promoters as f64 - detractors as f64) / total as f64 * 100.0,
        }
    }
}

/// Group rows by the calendar date of `review_date` and emit one point
/// per date present, ascending. Dates with no reviews are absent, not
/// zero-filled; rows without a parseable date are skipped.
pub fn daily_series(rows: &[Review]) -> Vec<DailyPoint> {
    let mut by_date: BTreeMap<chrono::NaiveDate, (u64, i64, u64)> = BTreeMap::new();
    for r in rows {
        if let Some(d) = r.date() {
            let entry = by_date.entry(d).or_default();
            entry.0 += 1;
            if let Some(rating) = r.rating {
                entry.1 += rating as i64;
                entry.2 += 1;
            }
        }
    }
    by_date
        .into_iter()
        .map(|(date, (count, sum, rated))| DailyPoint {
            date,
            count,
            avg_rating: if rated > 0 { sum as f64 / rated as f64 } else { 0.0 },
        })
        .collect()
}

/// Review counts per source channel, most frequent first. Ties break
/// alphabetically so the output is stable across loads.
pub fn source_counts(rows: &[Review]) -> Vec<SourceCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for r in rows {
        if let Some(s) = r.source.as_deref() {
            *counts.entry(s).or_default() += 1;
        }
    }
    let mut out: Vec<SourceCount> = counts
        .into_iter()
        .map(|(source, count)| SourceCount {
            source: source.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
    out
}

/// Review counts per rating value present, ascending by rating.
pub fn rating_counts(rows: &[Review]) -> Vec<RatingCount> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for r in rows {
        if let Some(rating) = r.rating {
            *counts.entry(rating).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(rating, count)| RatingCount { rating, count })
        .collect()
}
