// file: src/scoring/mod.rs
// description: relevance scoring module exports
// reference: internal module structure

pub mod normalizer;
pub mod profile;
pub mod scorer;

pub use normalizer::normalize;
pub use profile::QueryProfile;
pub use scorer::{
    BOOST_WEIGHT, PENALTY_WEIGHT, RelevanceScorer, ScoreBreakdown, combine, count_occurrences,
    score, score_breakdown,
};
