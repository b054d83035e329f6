pub mod cache;

pub use cache::CachedSource;

use std::time::Duration;

use crate::error::{Error, Result};
use crate::record::Review;

/// Row cap applied to the one read query. The dashboard never paginates;
/// it loads at most this many rows per pass.
pub const DEFAULT_ROW_LIMIT: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and row limit for the hosted review store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base endpoint URL of the hosted store.
    pub url: String,
    /// Opaque access key, sent as both the API key and bearer token.
    pub key: String,
    pub limit: u32,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let url = url.into();
        url::Url::parse(&url).map_err(|e| Error::Config(format!("invalid store URL: {e}")))?;
        Ok(Self {
            url,
            key: key.into(),
            limit: DEFAULT_ROW_LIMIT,
        })
    }

    /// Read credentials from `REVIEWDASH_URL` and `REVIEWDASH_KEY`, with an
    /// optional `REVIEWDASH_LIMIT` row cap. Secrets stay in the environment;
    /// nothing is ever persisted.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("REVIEWDASH_URL")
            .map_err(|_| Error::Config("REVIEWDASH_URL is not set".into()))?;
        let key = std::env::var("REVIEWDASH_KEY")
            .map_err(|_| Error::Config("REVIEWDASH_KEY is not set".into()))?;
        let mut config = Self::new(url, key)?;
        if let Ok(limit) = std::env::var("REVIEWDASH_LIMIT") {
            config.limit = limit
                .parse()
                .map_err(|_| Error::Config(format!("invalid REVIEWDASH_LIMIT: {limit}")))?;
        }
        Ok(config)
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// A read-only review source. Injected into the dashboard so the pipeline
/// can be exercised without a live store.
pub trait DataSource {
    /// Fetch all review rows, bounded by the configured limit.
    fn fetch_reviews(&self) -> impl std::future::Future<Output = Result<Vec<Review>>> + Send;
}

/// Gateway to a PostgREST-style hosted store. Issues the single read
/// query `GET <url>/rest/v1/reviews?select=*&limit=<N>`.
pub struct RestStore {
    config: StoreConfig,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(StoreConfig::from_env()?)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/reviews", self.config.url.trim_end_matches('/'))
    }
}

impl DataSource for RestStore {
    async fn fetch_reviews(&self) -> Result<Vec<Review>> {
        let limit = self.config.limit.to_string();
        log::debug!("querying {} (limit {})", self.table_url(), limit);

        let resp = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("limit", limit.as_str())])
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Query(format!(
                "store returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let rows: Vec<Review> = resp.json().await?;
        log::info!("loaded {} review rows", rows.len());
        Ok(rows)
    }
}
