use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::text;

/// Canonical article record as served to readers.
///
/// `id` is a position in the served list, not an identity: it is reassigned
/// every time the list is sorted and truncated. The cluster fields stay at
/// their zero values until topic labeling runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: usize,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub source: String,
    pub source_icon: String,
    pub url: String,
    pub thumbnail: String,
    pub published_at: String,
    pub topic_id: usize,
    pub cluster_id: String,
    pub cluster_title: String,
}

impl Article {
    /// Lowercased, trimmed URL, or title when the URL is empty.
    pub fn dedup_key(&self) -> String {
        let base = if self.url.is_empty() { &self.title } else { &self.url };
        base.trim().to_lowercase()
    }

    /// Parsed `published_at`; unparsable dates map to the Unix epoch.
    pub fn published_timestamp(&self) -> DateTime<Utc> {
        text::parse_date(&self.published_at)
    }

    /// Text handed to the embedding model.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.summary).trim().to_string()
    }

    pub fn is_clustered(&self) -> bool {
        self.topic_id != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: usize,
    pub rank: usize,
    pub title: String,
    pub explanation: String,
}

/// The persisted/served result. Without `topics` it is the article-only
/// shape; the field is omitted from JSON entirely in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDigest {
    pub built_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
    pub articles: Vec<Article>,
}

impl NewsDigest {
    pub fn articles_only(articles: Vec<Article>) -> Self {
        Self {
            built_at: Utc::now(),
            topics: None,
            articles,
        }
    }

    pub fn with_topics(topics: Vec<Topic>, articles: Vec<Article>) -> Self {
        Self {
            built_at: Utc::now(),
            topics: Some(topics),
            articles,
        }
    }

    pub fn has_topics(&self) -> bool {
        self.topics.is_some()
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.built_at)
    }
}

/// One feed item as delivered by a source, before normalization.
///
/// Every field is optional; the normalizer decides what a missing field
/// becomes. The serde names follow the common rss-parser JSON shape so
/// fixtures and external producers can be read directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub creator: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    #[serde(rename = "isoDate")]
    pub iso_date: Option<String>,
    #[serde(rename = "contentSnippet")]
    pub content_snippet: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "content:encoded")]
    pub content_encoded: Option<String>,
    pub enclosure: Option<Enclosure>,
    #[serde(rename = "media:content")]
    pub media_content: Option<MediaField>,
    #[serde(rename = "media:thumbnail")]
    pub media_thumbnail: Option<MediaField>,
}

impl RawFeedItem {
    /// `content:encoded` wins over plain `content`.
    pub fn html_body(&self) -> &str {
        non_empty(self.content_encoded.as_deref())
            .or_else(|| non_empty(self.content.as_deref()))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enclosure {
    pub url: Option<String>,
}

/// `media:content` / `media:thumbnail` arrive as a single entry or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaField {
    Many(Vec<MediaEntry>),
    One(MediaEntry),
}

impl MediaField {
    pub fn first_url(&self) -> Option<&str> {
        match self {
            MediaField::Many(entries) => entries.iter().find_map(MediaEntry::url),
            MediaField::One(entry) => entry.url(),
        }
    }
}

/// A bare URL string, `{ "url": .. }`, or attribute style `{ "$": { "url": .. } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaEntry {
    Url(String),
    Object(MediaObject),
}

impl MediaEntry {
    pub fn url(&self) -> Option<&str> {
        match self {
            MediaEntry::Url(url) => non_empty(Some(url)),
            MediaEntry::Object(obj) => non_empty(obj.url.as_deref())
                .or_else(|| non_empty(obj.attrs.as_ref().and_then(|a| a.url.as_deref()))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaObject {
    pub url: Option<String>,
    #[serde(rename = "$")]
    pub attrs: Option<MediaAttrs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaAttrs {
    pub url: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_prefers_url() {
        let article = Article {
            title: "Some Title".to_string(),
            url: "  HTTPS://Example.com/A ".to_string(),
            ..Default::default()
        };
        assert_eq!(article.dedup_key(), "https://example.com/a");

        let article = Article {
            title: " Only Title ".to_string(),
            ..Default::default()
        };
        assert_eq!(article.dedup_key(), "only title");
    }

    #[test]
    fn test_digest_shapes() {
        let articles = vec![Article { id: 1, ..Default::default() }];

        let only = serde_json::to_value(NewsDigest::articles_only(articles.clone())).unwrap();
        assert!(only.get("topics").is_none());
        assert!(only.get("builtAt").is_some());
        assert_eq!(only["articles"][0]["topicId"], 0);
        assert_eq!(only["articles"][0]["sourceIcon"], "");

        let topics = vec![Topic { id: 1, rank: 1, title: "t".into(), explanation: "e".into() }];
        let full = serde_json::to_value(NewsDigest::with_topics(topics, articles)).unwrap();
        assert_eq!(full["topics"][0]["rank"], 1);
    }

    #[test]
    fn test_raw_item_media_variants() {
        let item: RawFeedItem = serde_json::from_str(r#"{
            "title": "t",
            "media:content": [{"$": {"url": "https://img/a.jpg", "medium": "image"}}]
        }"#).unwrap();
        assert_eq!(item.media_content.unwrap().first_url(), Some("https://img/a.jpg"));

        let item: RawFeedItem = serde_json::from_str(r#"{"media:thumbnail": "https://img/b.jpg"}"#).unwrap();
        assert_eq!(item.media_thumbnail.unwrap().first_url(), Some("https://img/b.jpg"));

        let item: RawFeedItem = serde_json::from_str(r#"{"media:content": {"url": "https://img/c.jpg"}}"#).unwrap();
        assert_eq!(item.media_content.unwrap().first_url(), Some("https://img/c.jpg"));

        let item: RawFeedItem = serde_json::from_str(r#"{"media:content": [{"width": "10"}, "https://img/d.jpg"]}"#).unwrap();
        assert_eq!(item.media_content.unwrap().first_url(), Some("https://img/d.jpg"));
    }

    #[test]
    fn test_html_body_prefers_encoded() {
        let item = RawFeedItem {
            content: Some("plain".into()),
            content_encoded: Some("<p>encoded</p>".into()),
            ..Default::default()
        };
        assert_eq!(item.html_body(), "<p>encoded</p>");
        assert_eq!(RawFeedItem::default().html_body(), "");
    }
}
