use std::fmt;
use nt_core::{EmbeddingModel, Result};

/// Deterministic bag-of-words embedder. Each token is hashed into one of
/// `dimension` buckets with a sign bit, and the result is L2-normalized.
/// Texts sharing vocabulary land close together, which is enough to group
/// headlines without a model download.
pub struct HashingModel {
    dimension: usize,
}

impl fmt::Debug for HashingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashingModel")
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl Default for HashingModel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSION)
    }
}

impl HashingModel {
    pub const DEFAULT_DIMENSION: usize = 384;

    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|v| *v /= norm);
        }
        embedding
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    bytes.iter().fold(OFFSET, |hash, b| (hash ^ *b as u64).wrapping_mul(PRIME))
}

#[async_trait::async_trait]
impl EmbeddingModel for HashingModel {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }
}
