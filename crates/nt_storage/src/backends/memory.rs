use async_trait::async_trait;
use nt_core::{DigestStorage, NewsDigest, Result};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryStore {
    articles: Option<NewsDigest>,
    topics: Option<NewsDigest>,
}

/// Keeps the latest digest of each shape in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: RwLock<MemoryStore>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DigestStorage for MemoryStorage {
    async fn store_digest(&self, digest: &NewsDigest) -> Result<()> {
        let mut store = self.store.write().await;
        if digest.has_topics() {
            store.topics = Some(digest.clone());
        } else {
            store.articles = Some(digest.clone());
        }
        Ok(())
    }

    async fn latest_articles(&self) -> Result<Option<NewsDigest>> {
        Ok(self.store.read().await.articles.clone())
    }

    async fn latest_topics(&self) -> Result<Option<NewsDigest>> {
        Ok(self.store.read().await.topics.clone())
    }
}
