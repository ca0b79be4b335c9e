// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod post;
pub mod report;

pub use document::{Document, ScoredDocument};
pub use post::{Comment, PostRecord, RedditPost};
pub use report::{ScoreFailure, ScoreOutcome, ScoringReport};
