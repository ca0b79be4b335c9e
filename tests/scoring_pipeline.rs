// file: tests/scoring_pipeline.rs
// description: end-to-end scoring through the public api with a stub embedder

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use subreddit_relevance::{
    Document, JsonExporter, JsonFileSource, PipelineOrchestrator, QueryProfile, RelevanceError,
    RelevancePipeline, RelevanceScorer, Result, TextEmbedder, normalize, score,
};
use tempfile::tempdir;

struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
}

impl TableEmbedder {
    fn new(fallback: Vec<f32>) -> Self {
        Self {
            table: HashMap::new(),
            fallback,
        }
    }

    fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.table.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl TextEmbedder for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("EMBED_FAIL") {
            return Err(RelevanceError::EmbeddingUnavailable("quota exceeded".to_string()));
        }
        Ok(self.table.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
    }

    fn dimensions(&self) -> usize {
        self.fallback.len()
    }

    fn model(&self) -> &str {
        "table"
    }
}

const QUERY: &str = "clinical trial participation";

async fn scorer(embedder: TableEmbedder, penalty: &[&str], boost: &[&str]) -> RelevanceScorer {
    let embedder = Arc::new(embedder.with(QUERY, vec![1.0, 0.0]));
    let profile = QueryProfile::build(QUERY, penalty.iter(), boost.iter(), embedder.as_ref())
        .await
        .unwrap();
    RelevanceScorer::new(Arc::new(profile), embedder)
}

#[tokio::test]
async fn boosted_document_scores_above_one() {
    let text = "I love clinical trials and patient recruitment";
    let scorer = scorer(
        TableEmbedder::new(vec![0.0, 1.0]).with(text, vec![0.8, 0.6]),
        &["job", "hiring"],
        &["patient", "recruitment"],
    )
    .await;

    let value = score(text, scorer.profile(), scorer.embedder()).await.unwrap();
    assert!((value - 1.0).abs() < 1e-6, "got {}", value);
}

#[tokio::test]
async fn penalised_document_scores_negative() {
    let scorer = scorer(
        TableEmbedder::new(vec![0.0, 1.0]),
        &["job", "hiring", "intern", "cro"],
        &["patient"],
    )
    .await;

    let breakdown = scorer
        .score("Looking for a job, hiring interns for CRO work")
        .await
        .unwrap();
    assert_eq!(breakdown.penalty_hits, 4);
    assert!((breakdown.score + 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn batch_survives_single_embedding_failure() {
    let scorer = scorer(TableEmbedder::new(vec![0.6, 0.8]), &["job"], &["trial"]).await;
    let pipeline = RelevancePipeline::new(scorer, 2);

    let report = pipeline
        .score_all(vec![
            Document::new("one", "a trial update", ()),
            Document::new("two", "EMBED_FAIL here", ()),
            Document::new("three", "job board", ()),
        ])
        .await
        .unwrap();

    let mut scored: Vec<&str> = report.scored.iter().map(|d| d.id.as_str()).collect();
    scored.sort();
    assert_eq!(scored, vec!["one", "three"]);
    assert_eq!(report.failed_ids(), vec!["two"]);
    assert!(report.failures[0].reason.contains("quota exceeded"));
}

#[tokio::test]
async fn rescore_round_trip_through_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("post_data.json");
    let record = |title: &str, selftext: &str| {
        json!({
            "title": title, "selftext": selftext, "author": "N/A",
            "weighted_similarity": 0.0, "upvote_ratio": 0.9,
            "created_utc": 1700000000.0, "created_date": "2023-11-14",
            "score": 3, "url": "https://reddit.com/x", "num_comments": 1,
            "subreddit": "clinicaltrials",
            "comments": [{"author": "c", "body": "trial trial", "score": 1, "created_utc": 1700000001.0}]
        })
    };
    fs::write(
        &input,
        serde_json::to_string(&json!({
            "keep": record("Joining a trial", "details at https://example.com/trial"),
            "drop": record("EMBED_FAIL", ""),
        }))
        .unwrap(),
    )
    .unwrap();

    let scorer = scorer(TableEmbedder::new(vec![1.0, 0.0]), &["job"], &["trial"]).await;
    let pipeline = RelevancePipeline::new(scorer, 1);
    let exporter = JsonExporter::new(dir.path().join("out"), true).unwrap();
    let source = JsonFileSource::load(&input).unwrap();

    let summary = PipelineOrchestrator::new(&pipeline, &exporter)
        .with_comment_scoring(true)
        .with_color(false)
        .run(&source, &source.subreddits(), "rescored")
        .await
        .unwrap();

    assert_eq!(summary.stats.posts_scored, 1);
    assert_eq!(summary.stats.comments_scored, 1);
    assert_eq!(summary.failures.len(), 1);

    let data: Value = serde_json::from_str(&fs::read_to_string(&summary.output).unwrap()).unwrap();
    let keep = &data["keep"];
    // "trial" appears once after the url is stripped
    assert_eq!(
        normalize("Joining a trial details at https://example.com/trial"),
        "Joining trial details at "
    );
    assert!((keep["weighted_similarity"].as_f64().unwrap() - 1.1).abs() < 1e-6);
    assert!((keep["comments"][0]["weighted_similarity"].as_f64().unwrap() - 1.2).abs() < 1e-6);
    assert!(data.get("drop").is_none());
}
