use std::time::Duration;
use async_trait::async_trait;
use nt_core::types::{Enclosure, MediaEntry, MediaField, MediaObject};
use nt_core::{text, Error, RawFeedItem, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use rss::extension::Extension;
use rss::{Channel, Item};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117 Safari/537.36";

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch and parse one feed
    async fn fetch(&self, url: &str) -> Result<Vec<RawFeedItem>>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// RSS 2.0 over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/rss+xml, application/xml;q=0.9, */*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.7,en;q=0.5"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        parse_feed(&body)
    }
}

pub fn parse_feed(body: &[u8]) -> Result<Vec<RawFeedItem>> {
    let channel = Channel::read_from(body)
        .map_err(|e| Error::Feed(format!("Failed to parse feed: {}", e)))?;
    Ok(channel.items().iter().map(raw_item).collect())
}

fn raw_item(item: &Item) -> RawFeedItem {
    let dublin_core = item.dublin_core_ext();
    let snippet_source = item.description().or(item.content());

    RawFeedItem {
        title: item.title().map(str::to_string),
        link: item.link().map(str::to_string),
        creator: dublin_core.and_then(|dc| dc.creators().first().cloned()),
        author: item.author().map(str::to_string),
        pub_date: item.pub_date().map(str::to_string),
        iso_date: dublin_core.and_then(|dc| dc.dates().first().cloned()),
        content_snippet: snippet_source.map(text::snippet),
        content: item.description().map(str::to_string),
        content_encoded: item.content().map(str::to_string),
        enclosure: item.enclosure().map(|e| Enclosure {
            url: Some(e.url().to_string()),
        }),
        media_content: media_field(item, "content"),
        media_thumbnail: media_field(item, "thumbnail"),
    }
}

fn media_field(item: &Item, name: &str) -> Option<MediaField> {
    let elements = item.extensions().get("media")?.get(name)?;
    let entries: Vec<MediaEntry> = elements.iter().filter_map(media_entry).collect();
    if entries.is_empty() {
        None
    } else {
        Some(MediaField::Many(entries))
    }
}

fn media_entry(element: &Extension) -> Option<MediaEntry> {
    if let Some(url) = element.attrs().get("url") {
        return Some(MediaEntry::Object(MediaObject {
            url: Some(url.clone()),
            attrs: None,
        }));
    }
    element
        .value()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| MediaEntry::Url(v.to_string()))
}
