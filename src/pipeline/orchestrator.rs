// file: src/pipeline/orchestrator.rs
// description: coordinates collection, scoring, and streaming persistence per subreddit
// reference: orchestrates asynchronous scoring workflow

use crate::error::Result;
use crate::exporter::{ExportManifest, JsonExporter, RecordWriter};
use crate::models::post::PostRecord;
use crate::models::{ScoreFailure, ScoreOutcome};
use crate::pipeline::processor::RelevancePipeline;
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::reddit::PostSource;
use futures::stream::{StreamExt, TryStreamExt};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: PipelineStats,
    pub failures: Vec<ScoreFailure>,
    pub output: PathBuf,
    pub manifest: PathBuf,
}

pub struct PipelineOrchestrator<'a> {
    pipeline: &'a RelevancePipeline,
    exporter: &'a JsonExporter,
    score_comments: bool,
    colored: bool,
}

impl<'a> PipelineOrchestrator<'a> {
    pub fn new(pipeline: &'a RelevancePipeline, exporter: &'a JsonExporter) -> Self {
        Self {
            pipeline,
            exporter,
            score_comments: false,
            colored: true,
        }
    }

    pub fn with_comment_scoring(mut self, enabled: bool) -> Self {
        self.score_comments = enabled;
        self
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Scores every post of `subreddits` and writes `{kind}_data.json`.
    pub async fn run(
        &self,
        source: &dyn PostSource,
        subreddits: &[String],
        kind: &str,
    ) -> Result<RunSummary> {
        let writer = self.exporter.open(kind)?;
        self.run_into(source, subreddits, kind, writer).await
    }

    /// Same as [`Self::run`] but writes to an already opened record writer.
    pub async fn run_into(
        &self,
        source: &dyn PostSource,
        subreddits: &[String],
        kind: &str,
        mut writer: RecordWriter,
    ) -> Result<RunSummary> {
        info!("Scraping data: {:?} subreddits...", subreddits);

        let progress = ProgressTracker::with_color(self.colored);
        let mut failures = Vec::new();

        for subreddit in subreddits {
            progress.set_prefix(format!("r/{}", subreddit));
            self.run_subreddit(source, subreddit, &mut writer, &progress, &mut failures)
                .await?;
        }

        let output = writer.finish()?;
        let stats = progress.get_stats();
        progress.finish();

        let manifest = ExportManifest::new(
            kind,
            self.pipeline.scorer().embedder().model(),
            stats.posts_scored,
            failures.clone(),
            vec![output.display().to_string()],
        );
        let manifest = self.exporter.write_manifest(&manifest)?;

        log_final_stats(&stats);

        Ok(RunSummary {
            stats,
            failures,
            output,
            manifest,
        })
    }

    async fn run_subreddit(
        &self,
        source: &dyn PostSource,
        subreddit: &str,
        writer: &mut RecordWriter,
        progress: &ProgressTracker,
        failures: &mut Vec<ScoreFailure>,
    ) -> Result<()> {
        let pipeline = self.pipeline;
        let outcomes = source
            .posts(subreddit)
            .map_ok(|post| post.into_document())
            .map(move |document| async move {
                match document {
                    Ok(document) => pipeline.score_document(document).await,
                    Err(e) => Err(e),
                }
            })
            .buffer_unordered(pipeline.workers());
        let mut outcomes = std::pin::pin!(outcomes);

        let mut seen = 0usize;
        while let Some(outcome) = outcomes.next().await {
            seen += 1;
            match outcome? {
                ScoreOutcome::Scored(scored) => {
                    let mut post = scored.provenance;
                    if self.score_comments {
                        let count = pipeline.score_comments(&mut post).await?;
                        progress.add_comments_scored(count);
                    } else {
                        post.clear_comment_scores();
                    }
                    writer.write_record(&scored.id, &PostRecord::from_post(post, scored.relevance_score))?;
                    progress.inc_posts_scored();
                }
                ScoreOutcome::Failed(failure) => {
                    progress.inc_posts_failed();
                    failures.push(failure);
                }
            }
        }

        if seen == 0 {
            warn!("No posts found in r/{}", subreddit);
        } else {
            info!("Finished r/{}: {} posts", subreddit, seen);
        }
        Ok(())
    }
}

fn log_final_stats(stats: &PipelineStats) {
    info!("=== Scoring Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Posts scored: {}", stats.posts_scored);
    info!("Posts failed: {}", stats.posts_failed);
    info!("Success rate: {:.2}%", stats.success_rate());
    info!("Comments scored: {}", stats.comments_scored);
    info!("Processing speed: {:.2} posts/sec", stats.posts_per_second());
    info!("=======================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelevanceError;
    use crate::models::post::{Comment, RedditPost};
    use crate::scoring::{QueryProfile, RelevanceScorer};
    use crate::test_support::StubEmbedder;
    use futures::stream::{self, BoxStream};
    use serde_json::Value;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct FixedSource(Vec<RedditPost>);

    impl PostSource for FixedSource {
        fn posts<'b>(&'b self, subreddit: &'b str) -> BoxStream<'b, Result<RedditPost>> {
            stream::iter(
                self.0
                    .iter()
                    .filter(move |p| p.subreddit == subreddit)
                    .cloned()
                    .map(Ok),
            )
            .boxed()
        }
    }

    /// Yields its posts, then a listing error.
    struct BrokenSource(Vec<RedditPost>);

    impl PostSource for BrokenSource {
        fn posts<'b>(&'b self, _subreddit: &'b str) -> BoxStream<'b, Result<RedditPost>> {
            let posts = self.0.iter().cloned().map(Ok);
            let failure = Err(RelevanceError::Reddit("listing page failed".to_string()));
            stream::iter(posts.chain(std::iter::once(failure))).boxed()
        }
    }

    async fn pipeline(embedder: StubEmbedder) -> RelevancePipeline {
        let embedder = Arc::new(embedder.with("query", vec![1.0, 0.0]));
        let profile = QueryProfile::build("query", ["job"], ["trial"], embedder.as_ref())
            .await
            .unwrap();
        RelevancePipeline::new(RelevanceScorer::new(Arc::new(profile), embedder), 1)
    }

    fn post(id: &str, title: &str, subreddit: &str) -> RedditPost {
        RedditPost {
            id: id.to_string(),
            title: title.to_string(),
            selftext: String::new(),
            author: "N/A".to_string(),
            upvote_ratio: 1.0,
            created_utc: 1_700_000_000.0,
            score: 1,
            url: String::new(),
            num_comments: 0,
            subreddit: subreddit.to_string(),
            comments: vec![],
        }
    }

    #[tokio::test]
    async fn test_run_persists_scored_posts_only() {
        let embedder = Arc::new(
            StubEmbedder::new(2)
                .with("query", vec![1.0, 0.0])
                .with_default(vec![1.0, 0.0])
                .failing_on("broken "),
        );
        let profile = QueryProfile::build("query", ["job"], ["trial"], embedder.as_ref())
            .await
            .unwrap();
        let pipeline =
            RelevancePipeline::new(RelevanceScorer::new(Arc::new(profile), embedder), 2);

        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path(), false).unwrap();
        let orchestrator = PipelineOrchestrator::new(&pipeline, &exporter).with_color(false);

        let source = FixedSource(vec![
            post("p1", "trial", "clinicaltrials"),
            post("p2", "broken", "clinicaltrials"),
            post("p3", "job", "clinicalresearch"),
        ]);
        let subreddits = vec!["clinicaltrials".to_string(), "clinicalresearch".to_string()];

        let summary = orchestrator.run(&source, &subreddits, "post").await.unwrap();
        assert_eq!(summary.stats.posts_scored, 2);
        assert_eq!(summary.stats.posts_failed, 1);
        assert_eq!(summary.failures[0].id, "p2");

        let data: Value =
            serde_json::from_str(&fs::read_to_string(&summary.output).unwrap()).unwrap();
        assert!(data.get("p2").is_none());
        assert!((data["p1"]["weighted_similarity"].as_f64().unwrap() - 1.1).abs() < 1e-6);
        assert!((data["p3"]["weighted_similarity"].as_f64().unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(data["p3"]["created_date"], "2023-11-14");
        assert!(summary.manifest.exists());
    }

    #[tokio::test]
    async fn test_fatal_error_keeps_previous_dataset() {
        let pipeline = pipeline(StubEmbedder::new(2).with_default(vec![1.0, 0.0])).await;
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path(), false).unwrap();
        fs::write(exporter.data_path("post"), r#"{"old": 1}"#).unwrap();

        let source = BrokenSource(vec![post("p1", "trial", "clinicaltrials")]);
        let result = PipelineOrchestrator::new(&pipeline, &exporter)
            .with_color(false)
            .run(&source, &["clinicaltrials".to_string()], "post")
            .await;
        assert!(result.is_err());

        let contents = fs::read_to_string(exporter.data_path("post")).unwrap();
        let data: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(data, serde_json::json!({"old": 1}));
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_comment_scores_dropped_without_comment_scoring() {
        let pipeline = pipeline(StubEmbedder::new(2).with_default(vec![1.0, 0.0])).await;
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path(), false).unwrap();

        let mut carried = post("p1", "trial", "clinicaltrials");
        carried.comments = vec![Comment {
            author: "x".to_string(),
            body: "old".to_string(),
            score: 0,
            created_utc: 0.0,
            weighted_similarity: Some(0.42),
        }];
        let source = FixedSource(vec![carried]);

        let summary = PipelineOrchestrator::new(&pipeline, &exporter)
            .with_color(false)
            .run(&source, &["clinicaltrials".to_string()], "rescored")
            .await
            .unwrap();

        let data: Value =
            serde_json::from_str(&fs::read_to_string(&summary.output).unwrap()).unwrap();
        assert_eq!(data["p1"]["comments"][0]["body"], "old");
        assert!(data["p1"]["comments"][0].get("weighted_similarity").is_none());
    }
}
