use std::sync::Arc;
use futures::future::join_all;
use nt_core::RawFeedItem;
use crate::fetcher::FeedFetcher;
use crate::logging::Logger;
use crate::normalizer::domain_of;

pub const DEFAULT_FEEDS: &[&str] = &[
    "https://news.google.com/rss?hl=ko&gl=KR&ceid=KR:ko",
    "https://www.yna.co.kr/rss/all.xml",
    "https://news.kbs.co.kr/rss/news/major.xml",
    "https://news.sbs.co.kr/news/rss/news.xml",
];

/// Split a comma separated list of feed URLs. Blank entries are dropped; an
/// empty list yields the built-in defaults.
pub fn parse_sources(raw: Option<&str>) -> Vec<String> {
    let sources: Vec<String> = raw
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if sources.is_empty() {
        DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect()
    } else {
        sources
    }
}

/// Fans out over every configured source. A source that fails is logged and
/// contributes nothing; it never fails the batch.
#[derive(Clone)]
pub struct FeedManager {
    fetcher: Arc<dyn FeedFetcher>,
    sources: Vec<String>,
}

impl FeedManager {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, sources: Vec<String>) -> Self {
        Self { fetcher, sources }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Items from all sources, concatenated in source order.
    pub async fn fetch_all(&self) -> Vec<RawFeedItem> {
        let futures = self.sources.iter().map(|source| {
            let fetcher = self.fetcher.clone();
            async move {
                let host = domain_of(source).unwrap_or_else(|| source.clone());
                let logger = Logger::new().with_prefix(format!("[{}]", host));
                match fetcher.fetch(source).await {
                    Ok(items) => {
                        logger.info(&format!("📥 Fetched {} items", items.len()));
                        items
                    }
                    Err(e) => {
                        logger.warn(&format!("⚠️ Feed failed: {}", e));
                        Vec::new()
                    }
                }
            }
        });

        join_all(futures).await.into_iter().flatten().collect()
    }
}

impl std::fmt::Debug for FeedManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedManager")
            .field("sources", &self.sources)
            .finish()
    }
}
