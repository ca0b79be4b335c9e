// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod embedding;
pub mod error;
pub mod exporter;
pub mod models;
pub mod pipeline;
pub mod reddit;
pub mod scoring;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, EmbeddingConfig, PipelineConfig, QueryConfig, RedditConfig};
pub use embedding::{FallbackEmbedder, OpenAiEmbeddingClient, TextEmbedder, cosine_similarity};
pub use error::{RelevanceError, Result};
pub use exporter::{ExportManifest, JsonExporter, RecordWriter};
pub use models::{
    Comment, Document, PostRecord, RedditPost, ScoreFailure, ScoreOutcome, ScoredDocument,
    ScoringReport,
};
pub use pipeline::{PipelineOrchestrator, PipelineStats, ProgressTracker, RelevancePipeline, RunSummary};
pub use reddit::{ApiCallThrottle, JsonFileSource, PostSource, RedditClient};
pub use scoring::{
    QueryProfile, RelevanceScorer, ScoreBreakdown, normalize, score, score_breakdown,
};
pub use utils::{OperationTimer, Validator};
