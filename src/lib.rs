pub mod date_util;
pub mod error;
pub mod export;
pub mod metrics;
pub mod query;
pub mod record;
pub mod source;

pub use error::{Error, Result};
pub use metrics::{DailyPoint, RatingCount, ReviewMetrics, SourceCount};
pub use query::filter::{sort_for_table, FilterCriteria, SortOrder, SourceFilter};
pub use query::period::{date_bounds, PeriodSpec, TimeWindow};
pub use record::Review;
pub use source::{CachedSource, DataSource, RestStore, StoreConfig};

use serde::Serialize;

/// Everything one render pass produces: scalar metrics, the daily series,
/// the breakdown panels, and the sorted table rows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub period: String,
    pub metrics: ReviewMetrics,
    pub daily: Vec<DailyPoint>,
    pub sources: Vec<SourceCount>,
    pub ratings: Vec<RatingCount>,
    pub rows: Vec<Review>,
}

/// One filter-and-aggregate pass over an already-loaded record set at a
/// fixed reference instant. Pure: no I/O, no clock reads, so the whole
/// pipeline is unit-testable. The aggregation path consumes the filtered
/// set in load order; only `rows` is sorted.
pub fn snapshot_at(
    records: &[Review],
    period: &PeriodSpec,
    criteria: &FilterCriteria,
    sort: SortOrder,
    now: chrono::NaiveDateTime,
) -> DashboardView {
    let window = period.resolve(now);
    let filtered = criteria.apply(records, &window);

    let metrics = ReviewMetrics::compute(&filtered);
    let daily = metrics::daily_series(&filtered);
    let sources = metrics::source_counts(&filtered);
    let ratings = metrics::rating_counts(&filtered);

    let mut rows = filtered;
    sort_for_table(&mut rows, sort);

    DashboardView {
        period: period.to_key(),
        metrics,
        daily,
        sources,
        ratings,
        rows,
    }
}

/// Main entry point: a review store behind the TTL cache, queried once
/// per render pass.
pub struct Dashboard<S> {
    source: CachedSource<S>,
}

impl<S: DataSource + Sync> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: CachedSource::with_default_ttl(source),
        }
    }

    pub fn with_ttl(source: S, ttl: std::time::Duration) -> Self {
        Self {
            source: CachedSource::new(source, ttl),
        }
    }

    /// Drop the memoized query result; the next pass re-queries the store.
    pub fn refresh(&self) {
        self.source.clear();
    }

    /// Load the raw record set (memoized within the TTL window).
    pub async fn load(&self) -> Result<Vec<Review>> {
        self.source.fetch_reviews().await
    }

    /// One full load-filter-aggregate pass.
    pub async fn snapshot(
        &self,
        period: &PeriodSpec,
        criteria: &FilterCriteria,
        sort: SortOrder,
    ) -> Result<DashboardView> {
        let records = self.load().await?;
        let now = chrono::Local::now().naive_local();
        Ok(snapshot_at(&records, period, criteria, sort, now))
    }
}
