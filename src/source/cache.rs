use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::record::Review;
use crate::source::DataSource;

/// Default lifetime of one memoized query result.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Time-to-live memoization of the single store query.
///
/// Repeated fetches inside the window reuse the previous rows instead of
/// re-querying. There is no invalidation beyond elapsed time or an
/// explicit `clear` (the user's manual refresh). Failed fetches are never
/// memoized.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    cell: Mutex<Option<(Instant, Vec<Review>)>>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cell: Mutex::new(None),
        }
    }

    pub fn with_default_ttl(inner: S) -> Self {
        Self::new(inner, DEFAULT_TTL)
    }

    /// Drop the memoized rows so the next fetch hits the store.
    pub fn clear(&self) {
        *self.lock_cell() = None;
    }

    fn lock_cell(&self) -> std::sync::MutexGuard<'_, Option<(Instant, Vec<Review>)>> {
        match self.cell.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<S: DataSource + Sync> DataSource for CachedSource<S> {
    async fn fetch_reviews(&self) -> Result<Vec<Review>> {
        if let Some((loaded_at, rows)) = self.lock_cell().as_ref() {
            if loaded_at.elapsed() < self.ttl {
                log::debug!("reusing {} memoized rows", rows.len());
                return Ok(rows.clone());
            }
        }

        let rows = self.inner.fetch_reviews().await?;
        *self.lock_cell() = Some((Instant::now(), rows.clone()));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingSource {
        calls: AtomicU32,
        fail: bool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DataSource for CountingSource {
        async fn fetch_reviews(&self) -> Result<Vec<Review>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::error::Error::Connection("store unreachable".into()));
            }
            Ok(vec![Review {
                id: 1,
                ..Default::default()
            }])
        }
    }

    #[tokio::test]
    async fn test_second_fetch_is_memoized() {
        let cached = CachedSource::new(CountingSource::new(), Duration::from_secs(3600));
        let first = cached.fetch_reviews().await.unwrap();
        let second = cached.fetch_reviews().await.unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(cached.inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_requeries() {
        let cached = CachedSource::new(CountingSource::new(), Duration::ZERO);
        cached.fetch_reviews().await.unwrap();
        cached.fetch_reviews().await.unwrap();
        assert_eq!(cached.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let cached = CachedSource::new(CountingSource::new(), Duration::from_secs(3600));
        cached.fetch_reviews().await.unwrap();
        cached.clear();
        cached.fetch_reviews().await.unwrap();
        assert_eq!(cached.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_memoized() {
        let cached = CachedSource::new(CountingSource::failing(), Duration::from_secs(3600));
        assert!(cached.fetch_reviews().await.is_err());
        assert!(cached.fetch_reviews().await.is_err());
        assert_eq!(cached.inner.calls(), 2);
    }
}
