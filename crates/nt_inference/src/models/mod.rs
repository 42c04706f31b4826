use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use nt_core::{EmbeddingModel, Error, Result};
use crate::EmbeddingConfig;

pub mod hashing;
pub mod openai;

pub use hashing::HashingModel;
pub use openai::OpenAiEmbeddingModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Any server speaking the OpenAI `/embeddings` protocol
    OpenAi,
    /// Local feature hashing, no network
    Hashing,
}

impl FromStr for EmbeddingBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "ollama" => Ok(Self::OpenAi),
            "hashing" | "local" => Ok(Self::Hashing),
            other => Err(Error::InvalidInput(format!(
                "Unknown embedding backend: {}. Available backends: openai, hashing",
                other
            ))),
        }
    }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Hashing => write!(f, "hashing"),
        }
    }
}

/// Build the configured model. Network backends are probed before returning,
/// so an `Ok` means the model answered at least once.
pub async fn create_model(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingModel>> {
    match config.backend {
        EmbeddingBackend::OpenAi => Ok(Arc::new(OpenAiEmbeddingModel::connect(config).await?)),
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingModel::new(config.dimension))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("openai".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::OpenAi);
        assert_eq!("Ollama".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::OpenAi);
        assert_eq!("hashing".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Hashing);
        assert!("word2vec".parse::<EmbeddingBackend>().is_err());
    }

    #[tokio::test]
    async fn test_create_hashing_model() {
        let config = EmbeddingConfig {
            backend: EmbeddingBackend::Hashing,
            dimension: 64,
            ..Default::default()
        };
        let model = create_model(&config).await.unwrap();
        assert_eq!(model.name(), "hashing");
        assert_eq!(model.generate_embeddings("hello world").await.unwrap().len(), 64);
    }
}
