use async_trait::async_trait;
use crate::types::NewsDigest;
use crate::Result;

#[async_trait]
pub trait DigestStorage: Send + Sync {
    /// Store a digest. Topic-bearing and article-only digests are kept apart.
    async fn store_digest(&self, digest: &NewsDigest) -> Result<()>;

    /// Most recent article-only digest, if any
    async fn latest_articles(&self) -> Result<Option<NewsDigest>>;

    /// Most recent digest carrying topics, if any
    async fn latest_topics(&self) -> Result<Option<NewsDigest>>;
}
