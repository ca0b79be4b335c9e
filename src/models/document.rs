// file: src/models/document.rs
// description: documents under evaluation and their scored counterparts

/// One post or comment awaiting a relevance score.
///
/// `provenance` rides along untouched so the caller gets back whatever it
/// attached (a full Reddit post, a comment, or `()` in tests).
#[derive(Debug, Clone, PartialEq)]
pub struct Document<P> {
    pub id: String,
    pub text: String,
    pub provenance: P,
}

impl<P> Document<P> {
    pub fn new(id: impl Into<String>, text: impl Into<String>, provenance: P) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            provenance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument<P> {
    pub id: String,
    pub text: String,
    pub relevance_score: f64,
    pub provenance: P,
}

impl<P> ScoredDocument<P> {
    pub fn from_document(document: Document<P>, relevance_score: f64) -> Self {
        Self {
            id: document.id,
            text: document.text,
            relevance_score,
            provenance: document.provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_document_keeps_provenance() {
        let doc = Document::new("abc", "title body", 42u32);
        let scored = ScoredDocument::from_document(doc, 0.75);

        assert_eq!(scored.id, "abc");
        assert_eq!(scored.text, "title body");
        assert_eq!(scored.provenance, 42);
        assert_eq!(scored.relevance_score, 0.75);
    }
}
