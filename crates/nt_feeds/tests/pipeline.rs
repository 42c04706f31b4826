use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use nt_core::{EmbeddingModel, Error, RawFeedItem, Result};
use nt_feeds::{FeedFetcher, FeedManager, NewsPipeline, PipelineConfig};
use nt_inference::models::HashingModel;
use nt_inference::SharedEmbedder;

struct FixtureFetcher {
    items: Vec<RawFeedItem>,
}

#[async_trait]
impl FeedFetcher for FixtureFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<RawFeedItem>> {
        Ok(self.items.clone())
    }
}

#[derive(Debug, Default)]
struct BrokenModel {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingModel for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    async fn generate_embeddings(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Embedding("model offline".to_string()))
    }
}

fn pipeline_with(items: Vec<RawFeedItem>, model: Arc<dyn EmbeddingModel>) -> NewsPipeline {
    let feeds = FeedManager::new(
        Arc::new(FixtureFetcher { items }),
        vec!["https://fixture.example.kr/rss".to_string()],
    );
    NewsPipeline::new(
        feeds,
        Arc::new(SharedEmbedder::with_model(model, 4)),
        PipelineConfig {
            seed: Some(42),
            ..Default::default()
        },
    )
}

fn item(link: &str, title: &str, snippet: &str, date: &str) -> RawFeedItem {
    RawFeedItem {
        title: Some(title.to_string()),
        link: Some(link.to_string()),
        content_snippet: Some(snippet.to_string()),
        pub_date: Some(date.to_string()),
        ..Default::default()
    }
}

fn nine_items() -> Vec<RawFeedItem> {
    let headlines = [
        ("Central bank raises interest rate", "inflation pressure on the central bank"),
        ("Interest rate hike by central bank", "bank rate decision surprises markets"),
        ("Markets react to central bank rate", "rate outlook and bank guidance"),
        ("Typhoon approaches southern coast", "typhoon warning issued for coast"),
        ("Typhoon brings heavy rain", "coast residents prepare for typhoon"),
        ("Typhoon damage on the coast", "rain and wind from the typhoon"),
        ("Football league final tonight", "league final tickets sold out"),
        ("Football fans gather for final", "league title decided in final"),
        ("League champion crowned in football final", "football season ends"),
    ];
    headlines
        .iter()
        .enumerate()
        .map(|(i, (title, snippet))| {
            item(
                &format!("https://fixture.example.kr/{}", i),
                title,
                snippet,
                &format!("Tue, {:02} Sep 2024 08:00:00 +0900", i + 1),
            )
        })
        .collect()
}

#[tokio::test]
async fn duplicate_links_collapse_to_one_article() {
    let items = vec![
        item("https://fixture.example.kr/same", "First copy", "", "Tue, 10 Sep 2024 08:00:00 +0900"),
        item(" HTTPS://FIXTURE.EXAMPLE.KR/SAME ", "Second copy", "", "Wed, 11 Sep 2024 08:00:00 +0900"),
    ];
    let pipeline = pipeline_with(items, Arc::new(HashingModel::default()));

    let articles = pipeline.fetch_articles().await;
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "First copy");
    assert_eq!(articles[0].id, 1);
}

#[tokio::test]
async fn nine_articles_cluster_into_at_most_three_topics() {
    let pipeline = pipeline_with(nine_items(), Arc::new(HashingModel::default()));
    let digest = pipeline.build().await;

    assert_eq!(digest.articles.len(), 9);
    let topics = digest.topics.as_ref().expect("topics are derived");
    assert!(!topics.is_empty() && topics.len() <= 3);

    let cluster_ids: HashSet<_> = digest.articles.iter().map(|a| a.cluster_id.clone()).collect();
    assert!(cluster_ids.len() <= 3);

    let topic_ids: HashSet<_> = topics.iter().map(|t| t.id).collect();
    for article in &digest.articles {
        assert!(!article.cluster_title.is_empty());
        assert!(topic_ids.contains(&article.topic_id));
    }

    let mut ranks: Vec<_> = topics.iter().map(|t| t.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=topics.len()).collect::<Vec<_>>());
}

#[tokio::test]
async fn same_seed_gives_same_topics() {
    let first = pipeline_with(nine_items(), Arc::new(HashingModel::default())).build().await;
    let second = pipeline_with(nine_items(), Arc::new(HashingModel::default())).build().await;

    let labels = |d: &nt_core::NewsDigest| -> Vec<String> {
        d.articles.iter().map(|a| a.cluster_id.clone()).collect()
    };
    assert_eq!(labels(&first), labels(&second));
}

#[tokio::test]
async fn failing_embedder_still_yields_articles() {
    let model = Arc::new(BrokenModel::default());
    let pipeline = pipeline_with(nine_items(), model.clone());

    let normalized = pipeline.fetch_articles().await.len();
    let digest = pipeline.build().await;

    assert!(model.calls.load(Ordering::SeqCst) > 0);
    assert!(!digest.has_topics());
    assert_eq!(digest.articles.len(), normalized);
    assert!(digest.articles.iter().all(|a| !a.is_clustered()));

    let json = serde_json::to_value(&digest).unwrap();
    assert!(json.get("topics").is_none());
    assert!(json.get("builtAt").is_some());
}

#[tokio::test]
async fn rss_parser_json_fixture_feeds_the_pipeline() {
    let fixture = r#"[
        {"title": "Fixture one", "link": "https://fixture.example.kr/a",
         "isoDate": "2024-09-10T00:00:00Z", "media:content": {"$": {"url": "https://img.example.kr/a.jpg"}}},
        {"title": "Fixture two", "creator": "Desk", "pubDate": "not a date"}
    ]"#;
    let items: Vec<RawFeedItem> = serde_json::from_str(fixture).unwrap();
    let pipeline = pipeline_with(items, Arc::new(HashingModel::default()));

    let articles = pipeline.fetch_articles().await;
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title, "Fixture one");
    assert_eq!(articles[0].thumbnail, "https://img.example.kr/a.jpg");
    assert_eq!(articles[0].source, "fixture.example.kr");
    assert_eq!(articles[1].source, "Desk");
}
