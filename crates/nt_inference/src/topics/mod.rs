use std::collections::{HashMap, HashSet};
use lazy_static::lazy_static;
use nt_core::text::strip_tags;
use nt_core::{Article, Error, Result, Topic};

pub const EXPLANATION_PREFIX: &str = "공통 키워드: ";

lazy_static! {
    static ref STOP_WORDS: HashSet<&'static str> = [
        "그리고", "그러나", "하지만", "또한", "이는", "그는", "그녀는", "대한", "에서", "으로",
        "에게", "했다", "합니다", "한다", "the", "a", "an", "and", "or", "to", "of", "in", "on",
        "for", "with", "by", "at", "from", "that", "this", "is", "are", "was", "were",
    ]
    .into_iter()
    .collect();
}

/// Most frequent tokens of `text`, highest count first.
///
/// Markup and anything that is not a letter, digit or whitespace is dropped.
/// Single-character tokens and stop words never count. Equal counts keep
/// first-seen order.
pub fn extract_keywords(text: &str, top_k: usize) -> Vec<String> {
    let cleaned: String = strip_tags(text)
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() <= 1 || STOP_WORDS.contains(token) {
            continue;
        }
        match index.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(top_k)
        .map(|(token, _)| token.to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct LabelerConfig {
    pub keywords_per_topic: usize,
    /// How many of the keywords make up the title
    pub title_keywords: usize,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            keywords_per_topic: 6,
            title_keywords: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopicLabeler {
    config: LabelerConfig,
}

impl TopicLabeler {
    pub fn new(config: LabelerConfig) -> Self {
        Self { config }
    }

    /// Turn cluster labels into topics and tag every article with its topic.
    ///
    /// `labels[i]` is the cluster of `articles[i]`. Topic ids follow the order
    /// in which clusters first appear in `articles`; only clusters with members
    /// produce a topic. The returned topics are already ranked.
    pub fn label(&self, articles: &mut [Article], labels: &[usize]) -> Result<Vec<Topic>> {
        if articles.len() != labels.len() {
            return Err(Error::Clustering(format!(
                "{} labels for {} articles",
                labels.len(),
                articles.len()
            )));
        }

        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut by_label: HashMap<usize, usize> = HashMap::new();
        for (i, &label) in labels.iter().enumerate() {
            let slot = *by_label.entry(label).or_insert_with(|| {
                groups.push((label, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(i);
        }

        let mut topics = Vec::with_capacity(groups.len());
        for (position, (label, members)) in groups.iter().enumerate() {
            let topic_id = position + 1;

            let titles = join_field(articles, members, |a| &a.title);
            let summaries = join_field(articles, members, |a| &a.summary);
            let keywords = extract_keywords(
                &format!("{} {}", titles, summaries),
                self.config.keywords_per_topic,
            );

            let title = if keywords.is_empty() {
                format!("Topic {}", topic_id)
            } else {
                keywords
                    .iter()
                    .take(self.config.title_keywords)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" · ")
            };
            let explanation = format!("{}{}", EXPLANATION_PREFIX, keywords.join(", "));

            for &i in members {
                let article = &mut articles[i];
                article.topic_id = topic_id;
                article.cluster_id = format!("c-{}", label);
                article.cluster_title = title.clone();
            }

            topics.push(Topic {
                id: topic_id,
                rank: topic_id,
                title,
                explanation,
            });
        }

        rank_topics(&mut topics);
        Ok(topics)
    }
}

fn join_field(articles: &[Article], members: &[usize], field: fn(&Article) -> &String) -> String {
    members
        .iter()
        .map(|&i| field(&articles[i]).as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sort by current rank, highest first, then renumber ranks from 1.
///
/// Starting from rank == id this puts the most recently created topic first.
/// It says nothing about cluster size or recency.
pub fn rank_topics(topics: &mut [Topic]) {
    topics.sort_by(|a, b| b.rank.cmp(&a.rank));
    for (i, topic) in topics.iter_mut().enumerate() {
        topic.rank = i + 1;
    }
}
