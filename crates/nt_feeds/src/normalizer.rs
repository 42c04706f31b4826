use std::cmp::Reverse;
use std::collections::HashSet;
use lazy_static::lazy_static;
use nt_core::{Article, RawFeedItem};
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_SOURCE: &str = "뉴스";
pub const DEFAULT_LIMIT: usize = 120;

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons?sz=64&domain_url=";

lazy_static! {
    static ref IMG: Selector = Selector::parse("img[src]").expect("img selector parses");
}

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Articles kept after sorting
    pub limit: usize,
    /// Attribution used when an item names no author and has no usable URL
    pub default_source: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            default_source: DEFAULT_SOURCE.to_string(),
        }
    }
}

/// Turns raw feed items into the served article list: map, dedup, sort by
/// date (newest first), truncate, renumber.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, items: &[RawFeedItem]) -> Vec<Article> {
        let mapped = items
            .iter()
            .enumerate()
            .map(|(i, item)| Article {
                id: i + 1,
                ..self.to_article(item)
            })
            .collect();

        let mut articles = dedup(mapped);
        sort_by_published(&mut articles);
        articles.truncate(self.config.limit);
        for (i, article) in articles.iter_mut().enumerate() {
            article.id = i + 1;
        }
        articles
    }

    /// Map one item. Missing fields become empty strings, never errors.
    pub fn to_article(&self, item: &RawFeedItem) -> Article {
        let url = text(&item.link).to_string();
        let source = first_non_empty(&[&item.creator, &item.author])
            .map(str::to_string)
            .or_else(|| domain_of(&url))
            .unwrap_or_else(|| self.config.default_source.clone());

        Article {
            id: 0,
            title: text(&item.title).to_string(),
            summary: text(&item.content_snippet).to_string(),
            content: item.html_body().to_string(),
            source,
            source_icon: favicon_for(&url),
            thumbnail: extract_thumbnail(item),
            published_at: first_non_empty(&[&item.pub_date, &item.iso_date])
                .unwrap_or_default()
                .to_string(),
            url,
            topic_id: 0,
            cluster_id: String::new(),
            cluster_title: String::new(),
        }
    }
}

fn text(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

fn first_non_empty<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields
        .iter()
        .copied()
        .filter_map(|f| f.as_deref())
        .find(|s| !s.is_empty())
}

/// Keep the first article per dedup key. Articles whose key is empty are
/// always kept.
pub fn dedup(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| {
            let key = article.dedup_key();
            key.is_empty() || seen.insert(key)
        })
        .collect()
}

/// Newest first. Stable, so equal dates keep feed order; unparsable dates
/// count as the epoch and sink to the end.
pub fn sort_by_published(articles: &mut [Article]) {
    articles.sort_by_cached_key(|a| Reverse(a.published_timestamp()));
}

/// Host of `url` without a leading `www.`.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

pub fn favicon_for(url: &str) -> String {
    match domain_of(url) {
        Some(host) => {
            let target = format!("https://{}", host);
            let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
            format!("{}{}", FAVICON_SERVICE, encoded)
        }
        None => String::new(),
    }
}

/// Enclosure, then the first usable media entry, then the first `<img>` in
/// the body. Empty when none of them has a URL.
pub fn extract_thumbnail(item: &RawFeedItem) -> String {
    let enclosure = item.enclosure.as_ref().and_then(|e| e.url.as_deref());
    if let Some(url) = enclosure.filter(|u| !u.is_empty()) {
        return url.to_string();
    }

    if let Some(media) = item.media_content.as_ref().or(item.media_thumbnail.as_ref()) {
        if let Some(url) = media.first_url() {
            return url.to_string();
        }
    }

    first_img_src(item.html_body()).unwrap_or_default()
}

fn first_img_src(html: &str) -> Option<String> {
    if !html.to_ascii_lowercase().contains("<img") {
        return None;
    }
    Html::parse_fragment(html)
        .select(&IMG)
        .filter_map(|el| el.value().attr("src"))
        .find(|src| !src.is_empty())
        .map(str::to_string)
}
