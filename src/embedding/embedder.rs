// file: src/embedding/embedder.rs
// description: text embedding capability consumed by the relevance scorer

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Converts text into a fixed-length vector.
///
/// Implementations are passed in explicitly so tests can substitute a stub.
/// A failing call must return [`crate::RelevanceError::EmbeddingUnavailable`].
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Declared output dimensionality.
    fn dimensions(&self) -> usize;

    /// Model identifier, used in logs and manifests.
    fn model(&self) -> &str;
}

#[async_trait]
impl<T: TextEmbedder + ?Sized> TextEmbedder for Arc<T> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text).await
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
