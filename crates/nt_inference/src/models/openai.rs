use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use nt_core::{EmbeddingModel, Error, Result};
use std::fmt;
use crate::EmbeddingConfig;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint (OpenAI, Ollama,
/// text-embeddings-inference, ...).
pub struct OpenAiEmbeddingModel {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    dimension: usize,
}

impl fmt::Debug for OpenAiEmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiEmbeddingModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl OpenAiEmbeddingModel {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model_name.clone(),
            dimension: 0,
        })
    }

    /// Build the client and make one request to learn the vector size.
    pub async fn connect(config: &EmbeddingConfig) -> Result<Self> {
        let mut model = Self::new(config)?;
        let sample = model.request("ping").await.map_err(|e| {
            Error::Embedding(format!(
                "Embedding endpoint is not available at {}: {}. \
                 Please ensure the server is running and the model '{}' is installed.",
                model.base_url, e, model.model
            ))
        })?;
        if sample.is_empty() {
            return Err(Error::Embedding(format!(
                "Model '{}' returned an empty embedding",
                model.model
            )));
        }
        model.dimension = sample.len();
        tracing::debug!(
            model = %model.model,
            dimension = model.dimension,
            "embedding endpoint ready"
        );
        Ok(model)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let mut builder = self.client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await?
            .error_for_status()?
            .json::<EmbeddingResponse>()
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("Response contained no embeddings".to_string()))
    }
}

#[async_trait]
impl EmbeddingModel for OpenAiEmbeddingModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.request(text).await?;
        if self.dimension != 0 && embedding.len() != self.dimension {
            return Err(Error::Embedding(format!(
                "Expected {} dimensions, got {}",
                self.dimension,
                embedding.len()
            )));
        }
        Ok(embedding)
    }
}
