use async_trait::async_trait;
use std::fmt;
use crate::Result;

/// Text to fixed-length vector. Implementations are expected to be cheap to
/// call repeatedly once constructed.
#[async_trait]
pub trait EmbeddingModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Generate an embedding for a piece of text
    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>>;
}
