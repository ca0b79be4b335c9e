// file: src/scoring/scorer.rs
// description: weighted relevance score combining cosine similarity with keyword adjustments

use crate::embedding::{TextEmbedder, cosine_similarity};
use crate::error::{RelevanceError, Result};
use crate::scoring::normalizer::normalize;
use crate::scoring::profile::QueryProfile;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

pub const PENALTY_WEIGHT: f64 = 0.2;
pub const BOOST_WEIGHT: f64 = 0.1;

/// The parts a relevance score is made of.
///
/// `score` is deliberately left unclamped and can fall outside `[-1, 1]`
/// when a text repeats keywords.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub similarity: f64,
    pub penalty_hits: usize,
    pub boost_hits: usize,
    pub score: f64,
}

impl ScoreBreakdown {
    pub fn new(similarity: f64, penalty_hits: usize, boost_hits: usize) -> Self {
        let score = similarity - PENALTY_WEIGHT * penalty_hits as f64
            + BOOST_WEIGHT * boost_hits as f64;
        Self {
            similarity,
            penalty_hits,
            boost_hits,
            score,
        }
    }
}

/// Non-overlapping substring count; no word boundaries.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

fn keyword_hits(lower: &str, keywords: &BTreeSet<String>) -> usize {
    keywords.iter().map(|k| count_occurrences(lower, k)).sum()
}

/// Scores already-cleaned text whose embedding is known.
pub fn combine(cleaned: &str, embedding: &[f32], profile: &QueryProfile) -> Result<ScoreBreakdown> {
    let similarity = cosine_similarity(embedding, profile.embedding())?;

    let lower = cleaned.to_lowercase();
    let penalty_hits = keyword_hits(&lower, profile.penalty_keywords());
    let boost_hits = keyword_hits(&lower, profile.boost_keywords());

    Ok(ScoreBreakdown::new(similarity, penalty_hits, boost_hits))
}

pub async fn score_breakdown(
    text: &str,
    profile: &QueryProfile,
    embedder: &dyn TextEmbedder,
) -> Result<ScoreBreakdown> {
    let cleaned = normalize(text);

    let embedding = embedder.embed(&cleaned).await.map_err(|e| match e {
        RelevanceError::EmbeddingUnavailable(_) => e,
        other => RelevanceError::EmbeddingUnavailable(other.to_string()),
    })?;

    let breakdown = combine(&cleaned, &embedding, profile)?;
    debug!(
        "similarity={:.4} penalties={} boosts={} score={:.4}",
        breakdown.similarity, breakdown.penalty_hits, breakdown.boost_hits, breakdown.score
    );
    Ok(breakdown)
}

pub async fn score(text: &str, profile: &QueryProfile, embedder: &dyn TextEmbedder) -> Result<f64> {
    score_breakdown(text, profile, embedder)
        .await
        .map(|b| b.score)
}

/// A profile paired with the embedder that built it. Cheap to clone into workers.
#[derive(Clone)]
pub struct RelevanceScorer {
    profile: Arc<QueryProfile>,
    embedder: Arc<dyn TextEmbedder>,
}

impl RelevanceScorer {
    pub fn new(profile: Arc<QueryProfile>, embedder: Arc<dyn TextEmbedder>) -> Self {
        Self { profile, embedder }
    }

    pub fn profile(&self) -> &QueryProfile {
        &self.profile
    }

    pub fn embedder(&self) -> &dyn TextEmbedder {
        self.embedder.as_ref()
    }

    pub async fn score(&self, text: &str) -> Result<ScoreBreakdown> {
        score_breakdown(text, &self.profile, self.embedder.as_ref()).await
    }
}
