// file: src/embedding/fallback.rs
// description: deterministic offline embedder for dry runs without an API key

use crate::embedding::embedder::TextEmbedder;
use crate::error::Result;
use async_trait::async_trait;
use tracing::warn;

pub const FALLBACK_MODEL: &str = "fallback-hash";

/// Hash-derived vectors. Identical text always yields the identical vector,
/// but the geometry carries no semantic meaning.
pub struct FallbackEmbedder {
    dimensions: usize,
}

impl FallbackEmbedder {
    pub fn new(dimensions: usize) -> Self {
        warn!("Using fallback embedding generation; similarity scores are not semantic");
        Self { dimensions }
    }

    pub fn generate(text: &str, dim: usize) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| {
            acc.wrapping_mul(31).wrapping_add(b as u64)
        });
        (0..dim)
            .map(|i| (hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0)
            .collect()
    }
}

#[async_trait]
impl TextEmbedder for FallbackEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::generate(text, self.dimensions))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        FALLBACK_MODEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_embedding() {
        let embedding = FallbackEmbedder::generate("test text", 384);
        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_fallback_embedding_deterministic() {
        let embedder = FallbackEmbedder::new(128);
        let emb1 = tokio_test::block_on(embedder.embed("same text")).unwrap();
        let emb2 = tokio_test::block_on(embedder.embed("same text")).unwrap();
        assert_eq!(emb1, emb2);
        assert_eq!(embedder.dimensions(), 128);
    }
}
