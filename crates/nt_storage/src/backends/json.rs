use std::path::PathBuf;
use async_trait::async_trait;
use nt_core::{DigestStorage, Error, NewsDigest, Result};

pub const ARTICLES_FILE: &str = "articles.json";
pub const TOPICS_FILE: &str = "topics.json";

/// Writes digests as pretty-printed JSON for static hosting:
/// `articles.json` for article-only digests, `topics.json` for digests with
/// topics.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, digest: &NewsDigest) -> PathBuf {
        if digest.has_topics() {
            self.dir.join(TOPICS_FILE)
        } else {
            self.dir.join(ARTICLES_FILE)
        }
    }

    async fn read(&self, file: &str) -> Result<Option<NewsDigest>> {
        let path = self.dir.join(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let digest = serde_json::from_slice(&bytes).map_err(|e| {
            Error::Storage(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Some(digest))
    }
}

#[async_trait]
impl DigestStorage for JsonFileStorage {
    async fn store_digest(&self, digest: &NewsDigest) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(digest);
        let json = serde_json::to_vec_pretty(digest)?;
        tokio::fs::write(&path, json).await?;
        tracing::info!("💾 Wrote {}", path.display());
        Ok(())
    }

    async fn latest_articles(&self) -> Result<Option<NewsDigest>> {
        self.read(ARTICLES_FILE).await
    }

    async fn latest_topics(&self) -> Result<Option<NewsDigest>> {
        self.read(TOPICS_FILE).await
    }
}
