pub mod fetcher;
pub mod logging;
pub mod manager;
pub mod normalizer;
pub mod pipeline;

pub use fetcher::{FeedFetcher, FetchConfig, HttpFeedFetcher};
pub use logging::{init_logging, Logger};
pub use manager::{parse_sources, FeedManager, DEFAULT_FEEDS};
pub use normalizer::{Normalizer, NormalizerConfig};
pub use pipeline::{NewsPipeline, PipelineConfig};

pub mod prelude {
    pub use super::{FeedFetcher, FeedManager, NewsPipeline, Normalizer};
    pub use nt_core::{Article, Error, NewsDigest, Result};
}
