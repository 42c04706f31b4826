use std::sync::Arc;
use std::time::Duration;
use nt_core::{DigestStorage, NewsDigest, Result};
use nt_feeds::NewsPipeline;
use nt_storage::MemoryStorage;
use tracing::debug;

pub struct AppState {
    pub pipeline: Arc<NewsPipeline>,
    pub cache: Arc<dyn DigestStorage>,
    pub cache_ttl: Duration,
}

impl AppState {
    pub fn new(pipeline: Arc<NewsPipeline>, cache_ttl: Duration) -> Self {
        Self {
            pipeline,
            cache: Arc::new(MemoryStorage::new()),
            cache_ttl,
        }
    }

    fn is_fresh(&self, digest: &NewsDigest) -> bool {
        digest
            .age()
            .to_std()
            .map(|age| age < self.cache_ttl)
            .unwrap_or(true)
    }

    pub async fn articles(&self) -> Result<NewsDigest> {
        if let Some(cached) = self.cache.latest_articles().await? {
            if self.is_fresh(&cached) {
                debug!("📦 Serving cached articles");
                return Ok(cached);
            }
        }

        let digest = self.pipeline.build_articles().await;
        self.cache.store_digest(&digest).await?;
        Ok(digest)
    }

    /// Topic digest, or the article-only shape when topics are unavailable.
    pub async fn topics(&self) -> Result<NewsDigest> {
        if let Some(cached) = self.cache.latest_topics().await? {
            if self.is_fresh(&cached) {
                debug!("📦 Serving cached topics");
                return Ok(cached);
            }
        }

        let digest = self.pipeline.build().await;
        self.cache.store_digest(&digest).await?;
        Ok(digest)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("pipeline", &self.pipeline)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}
