use std::sync::Arc;
use nt_core::{Article, Error, NewsDigest, Result, Topic};
use nt_inference::{KMeans, KMeansConfig, LabelerConfig, SharedEmbedder, TopicLabeler};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use crate::manager::FeedManager;
use crate::normalizer::{Normalizer, NormalizerConfig};

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub normalizer: NormalizerConfig,
    pub kmeans: KMeansConfig,
    pub labeler: LabelerConfig,
    /// Fixes the clustering outcome when set
    pub seed: Option<u64>,
}

/// Feeds → normalized articles → embeddings → clusters → labeled topics.
///
/// Topics are layered on top of the article list: when embedding or
/// clustering fails the articles are still returned, just without topics.
#[derive(Debug)]
pub struct NewsPipeline {
    feeds: FeedManager,
    embedder: Arc<SharedEmbedder>,
    normalizer: Normalizer,
    kmeans: KMeans,
    labeler: TopicLabeler,
    seed: Option<u64>,
}

impl NewsPipeline {
    pub fn new(feeds: FeedManager, embedder: Arc<SharedEmbedder>, config: PipelineConfig) -> Self {
        Self {
            feeds,
            embedder,
            normalizer: Normalizer::new(config.normalizer),
            kmeans: KMeans::new(config.kmeans),
            labeler: TopicLabeler::new(config.labeler),
            seed: config.seed,
        }
    }

    pub fn embedder(&self) -> &Arc<SharedEmbedder> {
        &self.embedder
    }

    /// Fetch every source and normalize the result.
    pub async fn fetch_articles(&self) -> Vec<Article> {
        let items = self.feeds.fetch_all().await;
        let articles = self.normalizer.normalize(&items);
        info!(
            raw = items.len(),
            count = articles.len(),
            "📰 Normalized {} articles",
            articles.len()
        );
        articles
    }

    pub async fn build_articles(&self) -> NewsDigest {
        NewsDigest::articles_only(self.fetch_articles().await)
    }

    /// Embed, cluster and label `articles` in place.
    pub async fn derive_topics(&self, articles: &mut [Article]) -> Result<Vec<Topic>> {
        if articles.is_empty() {
            return Err(Error::Clustering("no articles to cluster".to_string()));
        }

        let texts: Vec<String> = articles.iter().map(Article::embedding_text).collect();
        let vectors = self.embedder.embed_all(&texts).await?;

        let k = self.kmeans.suggested_k(articles.len());
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clustering = self.kmeans.fit(&vectors, k, &mut rng)?;
        info!(
            k,
            clusters = clustering.non_empty_clusters(),
            iterations = clustering.iterations,
            "🧩 Clustered {} articles",
            articles.len()
        );

        self.labeler.label(articles, &clustering.labels)
    }

    /// Attach topics to an article list, falling back to the article-only
    /// shape when topics cannot be derived.
    pub async fn topics_from(&self, mut articles: Vec<Article>) -> NewsDigest {
        match self.derive_topics(&mut articles).await {
            Ok(topics) => NewsDigest::with_topics(topics, articles),
            Err(e) => {
                warn!(error = %e, "⚠️ Topics unavailable, serving articles only");
                for article in articles.iter_mut() {
                    article.topic_id = 0;
                    article.cluster_id.clear();
                    article.cluster_title.clear();
                }
                NewsDigest::articles_only(articles)
            }
        }
    }

    pub async fn build(&self) -> NewsDigest {
        let articles = self.fetch_articles().await;
        self.topics_from(articles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FeedFetcher;
    use async_trait::async_trait;
    use nt_core::RawFeedItem;
    use nt_inference::models::HashingModel;

    struct StaticFetcher(Vec<RawFeedItem>);

    #[async_trait]
    impl FeedFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<RawFeedItem>> {
            Ok(self.0.clone())
        }
    }

    fn item(n: usize, title: &str) -> RawFeedItem {
        RawFeedItem {
            title: Some(title.to_string()),
            link: Some(format!("https://news.example.kr/{}", n)),
            pub_date: Some(format!("2024-09-{:02} 09:00:00", n + 1)),
            ..Default::default()
        }
    }

    fn pipeline(items: Vec<RawFeedItem>) -> NewsPipeline {
        let feeds = FeedManager::new(
            Arc::new(StaticFetcher(items)),
            vec!["https://news.example.kr/rss".to_string()],
        );
        let embedder = SharedEmbedder::with_model(Arc::new(HashingModel::default()), 4);
        NewsPipeline::new(
            feeds,
            Arc::new(embedder),
            PipelineConfig {
                seed: Some(7),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_derive_topics_rejects_empty_input() {
        let pipeline = pipeline(Vec::new());
        let mut articles = Vec::new();
        assert!(matches!(
            pipeline.derive_topics(&mut articles).await,
            Err(Error::Clustering(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_feed_degrades_to_articles_only() {
        let digest = pipeline(Vec::new()).build().await;
        assert!(!digest.has_topics());
        assert!(digest.articles.is_empty());
    }

    #[tokio::test]
    async fn test_build_tags_every_article() {
        let items = vec![
            item(1, "Seoul subway fares rise"),
            item(2, "Subway fares rise again in Seoul"),
            item(3, "Baseball final tonight"),
            item(4, "Baseball final tickets sold out"),
        ];
        let digest = pipeline(items).build().await;

        let topics = digest.topics.as_ref().unwrap();
        assert!(!topics.is_empty());
        assert!(topics.len() <= 2);
        assert_eq!(digest.articles.len(), 4);
        for article in &digest.articles {
            assert!(article.is_clustered());
            assert!(topics.iter().any(|t| t.id == article.topic_id));
        }
    }
}
