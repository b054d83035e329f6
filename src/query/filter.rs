use std::collections::BTreeSet;

use crate::query::period::TimeWindow;
use crate::record::Review;

/// Source channel restriction.
///
/// `Any` applies no restriction. `Only` is a strict membership test:
/// an empty allow-set matches nothing. UI-style "select all by default"
/// callers must construct `Any` (or derive the full set) explicitly —
/// the two meanings are kept distinct in the type rather than guessed
/// from an empty collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    Any,
    Only(BTreeSet<String>),
}

impl SourceFilter {
    pub fn only<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceFilter::Only(sources.into_iter().map(Into::into).collect())
    }

    fn matches(&self, review: &Review) -> bool {
        match self {
            SourceFilter::Any => true,
            SourceFilter::Only(set) => review
                .source
                .as_deref()
                .is_some_and(|s| set.contains(s)),
        }
    }
}

/// User filter selections for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub sources: SourceFilter,
    /// Inclusive rating range.
    pub rating: (i32, i32),
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            sources: SourceFilter::Any,
            rating: (1, 5),
        }
    }
}

impl FilterCriteria {
    /// Apply the interval, source, and rating predicates conjunctively.
    /// Never mutates the input; output preserves input order.
    pub fn apply(&self, records: &[Review], window: &TimeWindow) -> Vec<Review> {
        records
            .iter()
            .filter(|r| self.keeps(r, window))
            .cloned()
            .collect()
    }

    fn keeps(&self, review: &Review, window: &TimeWindow) -> bool {
        self.in_window(review, window)
            && self.sources.matches(review)
            && self.rating_ok(review)
    }

    fn in_window(&self, review: &Review, window: &TimeWindow) -> bool {
        if !window.is_bounded() {
            return true;
        }
        // A record whose date does not parse cannot satisfy a bounded window
        match review.timestamp() {
            Some(ts) => window.contains(ts),
            None => false,
        }
    }

    fn rating_ok(&self, review: &Review) -> bool {
        // Absent rating short-circuits the predicate as always-true
        match review.rating {
            Some(r) => r >= self.rating.0 && r <= self.rating.1,
            None => true,
        }
    }
}

/// Sort order for the table-display path. Aggregation always consumes
/// the unsorted filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateDesc,
    RatingAsc,
    RatingDesc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date-desc" => Some(SortOrder::DateDesc),
            "rating-asc" => Some(SortOrder::RatingAsc),
            "rating-desc" => Some(SortOrder::RatingDesc),
            _ => None,
        }
    }
}

/// Sort a filtered view for display. Rows without the sort key go last.
pub fn sort_for_table(rows: &mut [Review], order: SortOrder) {
    match order {
        SortOrder::DateDesc => {
            rows.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        }
        SortOrder::RatingAsc => {
            rows.sort_by_key(|r| r.rating.unwrap_or(i32::MAX));
        }
        SortOrder::RatingDesc => {
            rows.sort_by_key(|r| std::cmp::Reverse(r.rating.unwrap_or(i32::MIN)));
        }
    }
}
