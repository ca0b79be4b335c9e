// file: src/models/post.rs
// description: reddit posts, comments, and the persisted post record
// reference: reddit listing json (t3 / t1 things)

use crate::models::document::Document;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

pub const MISSING_AUTHOR: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_similarity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub upvote_ratio: f64,
    pub created_utc: f64,
    pub score: i64,
    pub url: String,
    pub num_comments: u64,
    pub subreddit: String,
    pub comments: Vec<Comment>,
}

impl RedditPost {
    /// Title and body joined by a single space.
    pub fn document_text(&self) -> String {
        format!("{} {}", self.title, self.selftext)
    }

    pub fn into_document(self) -> Document<RedditPost> {
        Document::new(self.id.clone(), self.document_text(), self)
    }

    /// Drops comment scores carried over from an earlier run.
    pub fn clear_comment_scores(&mut self) {
        for comment in &mut self.comments {
            comment.weighted_similarity = None;
        }
    }
}

/// One entry of the persisted dataset, keyed by post id in the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub weighted_similarity: f64,
    pub upvote_ratio: f64,
    pub created_utc: f64,
    pub created_date: String,
    pub score: i64,
    pub url: String,
    pub num_comments: u64,
    pub subreddit: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl PostRecord {
    pub fn from_post(post: RedditPost, weighted_similarity: f64) -> Self {
        Self {
            created_date: created_date(post.created_utc),
            title: post.title,
            selftext: post.selftext,
            author: post.author,
            weighted_similarity,
            upvote_ratio: post.upvote_ratio,
            created_utc: post.created_utc,
            score: post.score,
            url: post.url,
            num_comments: post.num_comments,
            subreddit: post.subreddit,
            comments: post.comments,
        }
    }

    pub fn into_post(self, id: impl Into<String>) -> RedditPost {
        RedditPost {
            id: id.into(),
            title: self.title,
            selftext: self.selftext,
            author: self.author,
            upvote_ratio: self.upvote_ratio,
            created_utc: self.created_utc,
            score: self.score,
            url: self.url,
            num_comments: self.num_comments,
            subreddit: self.subreddit,
            comments: self.comments,
        }
    }
}

/// `YYYY-MM-DD` in UTC.
pub fn created_date(created_utc: f64) -> String {
    DateTime::from_timestamp(created_utc as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn author_or_missing(author: Option<String>) -> String {
    match author {
        Some(name) if !name.is_empty() && name != "[deleted]" => name,
        _ => MISSING_AUTHOR.to_string(),
    }
}
