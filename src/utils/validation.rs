// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{RelevanceError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SUBREDDIT_NAME: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_]{1,20}$").expect("SUBREDDIT_NAME regex is valid");
}

pub struct Validator;

impl Validator {
    pub fn validate_query_text(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(RelevanceError::InvalidConfiguration(
                "query text is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Keywords are matched as substrings, so an empty keyword would match everywhere.
    pub fn validate_keywords(field: &str, keywords: &[String]) -> Result<()> {
        if let Some(position) = keywords.iter().position(|k| k.trim().is_empty()) {
            return Err(RelevanceError::InvalidConfiguration(format!(
                "{} contains an empty keyword at index {}",
                field, position
            )));
        }
        Ok(())
    }

    pub fn validate_subreddit_name(name: &str) -> Result<()> {
        if !SUBREDDIT_NAME.is_match(name) {
            return Err(RelevanceError::InvalidConfiguration(format!(
                "Invalid subreddit name: {}",
                name
            )));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RelevanceError::InvalidConfiguration(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text() {
        assert!(Validator::validate_query_text("clinical trials").is_ok());
        assert!(Validator::validate_query_text("").is_err());
        assert!(Validator::validate_query_text(" \t\n").is_err());
    }

    #[test]
    fn test_keywords() {
        let good = vec!["job".to_string(), "work experience".to_string()];
        assert!(Validator::validate_keywords("penalty_keywords", &good).is_ok());
        assert!(Validator::validate_keywords("boost_keywords", &[]).is_ok());

        let bad = vec!["job".to_string(), " ".to_string()];
        let err = Validator::validate_keywords("penalty_keywords", &bad).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_subreddit_names() {
        assert!(Validator::validate_subreddit_name("clinicaltrials").is_ok());
        assert!(Validator::validate_subreddit_name("Clinical_Research").is_ok());
        assert!(Validator::validate_subreddit_name("r/clinicaltrials").is_err());
        assert!(Validator::validate_subreddit_name("a").is_err());
        assert!(Validator::validate_subreddit_name("").is_err());
    }

    #[test]
    fn test_url() {
        assert!(Validator::validate_url("https://api.openai.com/v1").is_ok());
        assert!(Validator::validate_url("ftp://example.com").is_err());
    }
}
