// file: src/scoring/profile.rs
// description: immutable query profile built once per session

use crate::config::QueryConfig;
use crate::embedding::TextEmbedder;
use crate::error::{RelevanceError, Result};
use crate::utils::validation::Validator;
use std::collections::BTreeSet;
use tracing::info;

/// The reference topic every document is scored against.
///
/// Fields are private so the profile cannot change after [`QueryProfile::build`];
/// share it across workers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct QueryProfile {
    raw_query_text: String,
    embedding: Vec<f32>,
    penalty_keywords: BTreeSet<String>,
    boost_keywords: BTreeSet<String>,
}

impl QueryProfile {
    /// Embeds `query_text` exactly once and stores the vector as returned.
    ///
    /// Keywords are lowercased because they are matched against lowercased text.
    /// Fails with `InvalidConfiguration` on an empty query or empty keyword,
    /// with `EmbeddingUnavailable` when the embedder fails, and with
    /// `DimensionMismatch` when the vector does not have the embedder's declared length.
    pub async fn build<I, J, S, T>(
        query_text: &str,
        penalty_keywords: I,
        boost_keywords: J,
        embedder: &dyn TextEmbedder,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Validator::validate_query_text(query_text)?;
        let penalty_keywords = keyword_set("penalty_keywords", penalty_keywords)?;
        let boost_keywords = keyword_set("boost_keywords", boost_keywords)?;

        let embedding = embedder.embed(query_text).await.map_err(|e| match e {
            RelevanceError::EmbeddingUnavailable(_) => e,
            other => RelevanceError::EmbeddingUnavailable(other.to_string()),
        })?;

        if embedding.len() != embedder.dimensions() {
            return Err(RelevanceError::DimensionMismatch {
                expected: embedder.dimensions(),
                actual: embedding.len(),
            });
        }

        info!(
            "Built query profile: {} dims via {}, {} penalty / {} boost keywords",
            embedding.len(),
            embedder.model(),
            penalty_keywords.len(),
            boost_keywords.len()
        );

        Ok(Self {
            raw_query_text: query_text.to_string(),
            embedding,
            penalty_keywords,
            boost_keywords,
        })
    }

    pub async fn from_config(config: &QueryConfig, embedder: &dyn TextEmbedder) -> Result<Self> {
        Self::build(
            &config.defined_query,
            &config.penalty_keywords,
            &config.boost_keywords,
            embedder,
        )
        .await
    }

    pub fn raw_query_text(&self) -> &str {
        &self.raw_query_text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn penalty_keywords(&self) -> &BTreeSet<String> {
        &self.penalty_keywords
    }

    pub fn boost_keywords(&self) -> &BTreeSet<String> {
        &self.boost_keywords
    }
}

fn keyword_set<I, S>(field: &str, keywords: I) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keywords: Vec<String> = keywords
        .into_iter()
        .map(|k| k.as_ref().to_lowercase())
        .collect();
    Validator::validate_keywords(field, &keywords)?;
    Ok(keywords.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubEmbedder;

    #[tokio::test]
    async fn test_build_stores_embedding_verbatim() {
        let embedder = StubEmbedder::new(2).with("clinical trials", vec![3.0, 4.0]);
        let profile = QueryProfile::build("clinical trials", ["Hiring"], ["patient"], &embedder)
            .await
            .unwrap();

        assert_eq!(profile.embedding(), &[3.0, 4.0]);
        assert_eq!(profile.raw_query_text(), "clinical trials");
        assert!(profile.penalty_keywords().contains("hiring"));
        assert!(profile.boost_keywords().contains("patient"));
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_never_calls_embedder() {
        let embedder = StubEmbedder::new(2);
        let err = QueryProfile::build("  ", ["job"], ["patient"], &embedder)
            .await
            .unwrap_err();
        assert!(matches!(err, RelevanceError::InvalidConfiguration(_)));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let embedder = StubEmbedder::new(2).failing_on("query");
        let err = QueryProfile::build("query", Vec::<String>::new(), Vec::<String>::new(), &embedder)
            .await
            .unwrap_err();
        assert!(matches!(err, RelevanceError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_wrong_dimensionality_rejected() {
        let embedder = StubEmbedder::new(3).with("query", vec![1.0, 0.0]);
        let err = QueryProfile::build("query", ["job"], ["patient"], &embedder)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelevanceError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_keywords_collapse() {
        let embedder = StubEmbedder::new(2).with("query", vec![1.0, 0.0]);
        let profile = QueryProfile::build("query", ["job", "JOB", "cro"], ["trial"], &embedder)
            .await
            .unwrap();
        assert_eq!(profile.penalty_keywords().len(), 2);
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = crate::config::Config::default_config();
        let embedder = StubEmbedder::new(2).with(crate::config::DEFAULT_QUERY, vec![1.0, 0.0]);
        let profile = QueryProfile::from_config(&config.query, &embedder)
            .await
            .unwrap();
        assert_eq!(profile.penalty_keywords().len(), 11);
        assert_eq!(profile.boost_keywords().len(), 5);
    }
}
