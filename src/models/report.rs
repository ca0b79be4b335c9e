// file: src/models/report.rs
// description: per-document scoring outcomes and the batch report collecting them

use crate::models::document::ScoredDocument;
use serde::Serialize;

/// Why a single document was left unscored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFailure {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome<P> {
    Scored(ScoredDocument<P>),
    Failed(ScoreFailure),
}

impl<P> ScoreOutcome<P> {
    pub fn id(&self) -> &str {
        match self {
            ScoreOutcome::Scored(doc) => &doc.id,
            ScoreOutcome::Failed(failure) => &failure.id,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, ScoreOutcome::Scored(_))
    }
}

#[derive(Debug, Clone)]
pub struct ScoringReport<P> {
    pub scored: Vec<ScoredDocument<P>>,
    pub failures: Vec<ScoreFailure>,
}

impl<P> Default for ScoringReport<P> {
    fn default() -> Self {
        Self {
            scored: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<P> ScoringReport<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: ScoreOutcome<P>) {
        match outcome {
            ScoreOutcome::Scored(doc) => self.scored.push(doc),
            ScoreOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    pub fn total(&self) -> usize {
        self.scored.len() + self.failures.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.scored.len() as f64 / self.total() as f64) * 100.0
    }

    pub fn score_of(&self, id: &str) -> Option<f64> {
        self.scored
            .iter()
            .find(|doc| doc.id == id)
            .map(|doc| doc.relevance_score)
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.id.as_str()).collect()
    }
}

impl<P> FromIterator<ScoreOutcome<P>> for ScoringReport<P> {
    fn from_iter<I: IntoIterator<Item = ScoreOutcome<P>>>(iter: I) -> Self {
        let mut report = Self::new();
        for outcome in iter {
            report.push(outcome);
        }
        report
    }
}
