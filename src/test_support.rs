// file: src/test_support.rs
// description: stub embedder shared by unit tests

use crate::embedding::TextEmbedder;
use crate::error::{RelevanceError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Looks vectors up by exact text. Unknown text falls back to `default`
/// when set, otherwise fails like an unavailable service.
pub struct StubEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
    failures: HashSet<String>,
    default: Option<Vec<f32>>,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
            failures: HashSet::new(),
            default: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn with_default(mut self, vector: Vec<f32>) -> Self {
        self.default = Some(vector);
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failures.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextEmbedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.contains(text) {
            return Err(RelevanceError::EmbeddingUnavailable(
                "stub failure".to_string(),
            ));
        }
        self.vectors
            .get(text)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| RelevanceError::EmbeddingUnavailable(format!("no stub for {:?}", text)))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        "stub"
    }
}
