use std::fmt;
use std::time::Duration;

pub mod clustering;
pub mod embeddings;
pub mod models;
pub mod topics;

pub use clustering::{Clustering, KMeans, KMeansConfig};
pub use embeddings::SharedEmbedder;
pub use models::{create_model, EmbeddingBackend};
pub use topics::{extract_keywords, LabelerConfig, TopicLabeler};

#[derive(Clone)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Base URL of an OpenAI-compatible API, e.g. `http://localhost:11434/v1`
    pub base_url: String,
    pub model_name: String,
    pub api_key: Option<String>,
    /// Vector size for the hashing backend
    pub dimension: usize,
    /// Max in-flight embedding requests per batch
    pub concurrency: usize,
    pub timeout: Duration,
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("dimension", &self.dimension)
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::OpenAi,
            base_url: "http://localhost:11434/v1".to_string(),
            model_name: "all-minilm".to_string(),
            api_key: None,
            dimension: models::hashing::HashingModel::DEFAULT_DIMENSION,
            concurrency: 8,
            timeout: Duration::from_secs(30),
        }
    }
}

pub mod prelude {
    pub use super::EmbeddingConfig;
    pub use super::models::create_model;
    pub use super::{KMeans, SharedEmbedder, TopicLabeler};
    pub use nt_core::{Article, Error, Result, Topic};
}
