// file: src/pipeline/processor.rs
// description: scores documents concurrently, isolating per-document embedding failures
// reference: streams documents through normalize -> embed -> score -> emit

use crate::error::Result;
use crate::models::post::RedditPost;
use crate::models::{Document, ScoreFailure, ScoreOutcome, ScoredDocument, ScoringReport};
use crate::scoring::{RelevanceScorer, normalize};
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, warn};

const PREVIEW_CHARS: usize = 120;

pub struct RelevancePipeline {
    scorer: RelevanceScorer,
    workers: usize,
}

impl RelevancePipeline {
    pub fn new(scorer: RelevanceScorer, workers: usize) -> Self {
        Self {
            scorer,
            workers: workers.max(1),
        }
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scores one document.
    ///
    /// Embedding failures become `ScoreOutcome::Failed`; any other error
    /// (dimension mismatch) is returned and should stop the run.
    pub async fn score_document<P>(&self, document: Document<P>) -> Result<ScoreOutcome<P>> {
        match self.scorer.score(&document.text).await {
            Ok(breakdown) => {
                debug!("Scored {}: {:.4}", document.id, breakdown.score);
                Ok(ScoreOutcome::Scored(ScoredDocument::from_document(
                    document,
                    breakdown.score,
                )))
            }
            Err(e) if e.is_item_recoverable() => {
                warn!(
                    "Failed to score {}: {} | text: {}",
                    document.id,
                    e,
                    preview(&normalize(&document.text))
                );
                Ok(ScoreOutcome::Failed(ScoreFailure {
                    id: document.id,
                    reason: e.to_string(),
                }))
            }
            Err(e) => Err(e),
        }
    }

    /// Unordered stream of outcomes, at most `workers` embedding calls in flight.
    pub fn score_stream<'a, P, S>(
        &'a self,
        documents: S,
    ) -> impl Stream<Item = Result<ScoreOutcome<P>>> + 'a
    where
        P: Send + 'a,
        S: Stream<Item = Document<P>> + Send + 'a,
    {
        documents
            .map(move |document| self.score_document(document))
            .buffer_unordered(self.workers)
    }

    pub async fn score_all<P>(&self, documents: Vec<Document<P>>) -> Result<ScoringReport<P>>
    where
        P: Send,
    {
        let outcomes = self.score_stream(stream::iter(documents));
        let mut outcomes = std::pin::pin!(outcomes);

        let mut report = ScoringReport::new();
        while let Some(outcome) = outcomes.next().await {
            report.push(outcome?);
        }
        Ok(report)
    }

    /// Scores every comment body of `post` in place. Existing scores are cleared
    /// first, so a comment whose embedding fails ends with `weighted_similarity = None`.
    /// Returns how many were scored.
    pub async fn score_comments(&self, post: &mut RedditPost) -> Result<usize> {
        post.clear_comment_scores();
        let documents: Vec<Document<usize>> = post
            .comments
            .iter()
            .enumerate()
            .map(|(index, comment)| {
                Document::new(format!("{}/{}", post.id, index), comment.body.clone(), index)
            })
            .collect();

        let report = self.score_all(documents).await?;
        for scored in &report.scored {
            post.comments[scored.provenance].weighted_similarity = Some(scored.relevance_score);
        }
        Ok(report.scored.len())
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
