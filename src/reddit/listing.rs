// file: src/reddit/listing.rs
// description: reddit listing payloads and comment tree flattening
// reference: https://www.reddit.com/dev/api#listings

use crate::models::post::{Comment, RedditPost, author_or_missing};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    #[serde(default)]
    pub after: Option<String>,
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct PostData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub upvote_ratio: f64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub subreddit: String,
}

impl PostData {
    pub fn into_post(self, comments: Vec<Comment>) -> RedditPost {
        RedditPost {
            id: self.id,
            title: self.title,
            selftext: self.selftext,
            author: author_or_missing(self.author),
            upvote_ratio: self.upvote_ratio,
            created_utc: self.created_utc,
            score: self.score,
            url: self.url,
            num_comments: self.num_comments,
            subreddit: self.subreddit,
            comments,
        }
    }
}

/// Comments read from one response, plus the `more` stubs still to expand.
#[derive(Debug, Default, PartialEq)]
pub struct CommentBatch {
    pub comments: Vec<Comment>,
    pub more: Vec<MoreComments>,
}

/// A `more` placeholder. Empty `children` marks a "continue this thread"
/// link whose replies must be fetched through the parent comment.
#[derive(Debug, Clone, PartialEq)]
pub struct MoreComments {
    pub parent_id: String,
    pub children: Vec<String>,
}

impl MoreComments {
    pub fn is_continuation(&self) -> bool {
        self.children.is_empty()
    }

    /// Parent comment id without its `t1_` prefix.
    pub fn parent_comment(&self) -> Option<&str> {
        self.parent_id.strip_prefix("t1_")
    }
}

/// Flattens the `/comments/{id}` response depth-first, parents before replies.
///
/// The response is `[post_listing, comment_listing]`. `replies` is either an
/// empty string or a nested listing.
pub fn flatten_comments(response: &Value) -> CommentBatch {
    let mut batch = CommentBatch::default();
    if let Some(listing) = response.as_array().and_then(|parts| parts.get(1)) {
        collect_listing(listing, &mut batch);
    }
    batch
}

/// Replies below the focused comment of a `/comments/{id}?comment={parent}`
/// response. The focused comment itself is already known and is skipped.
pub fn flatten_continuation(response: &Value) -> CommentBatch {
    let mut batch = CommentBatch::default();
    let replies = response
        .as_array()
        .and_then(|parts| parts.get(1))
        .and_then(children_of)
        .and_then(|children| children.first())
        .and_then(|parent| parent.get("data"))
        .and_then(|data| data.get("replies"));

    if let Some(replies) = replies.filter(|r| r.is_object()) {
        collect_listing(replies, &mut batch);
    }
    batch
}

/// The flat `things` list returned by `/api/morechildren`.
pub fn flatten_more_children(response: &Value) -> CommentBatch {
    let mut batch = CommentBatch::default();
    if let Some(things) = response
        .get("json")
        .and_then(|j| j.get("data"))
        .and_then(|d| d.get("things"))
        .and_then(Value::as_array)
    {
        collect_things(things, &mut batch);
    }
    batch
}

fn children_of(listing: &Value) -> Option<&Vec<Value>> {
    listing
        .get("data")
        .and_then(|d| d.get("children"))
        .and_then(Value::as_array)
}

fn collect_listing(listing: &Value, batch: &mut CommentBatch) {
    if let Some(children) = children_of(listing) {
        collect_things(children, batch);
    }
}

fn collect_things(things: &[Value], batch: &mut CommentBatch) {
    for thing in things {
        let Some(data) = thing.get("data") else {
            continue;
        };

        match thing.get("kind").and_then(Value::as_str) {
            Some("t1") => {
                batch.comments.push(comment_from(data));
                if let Some(replies) = data.get("replies").filter(|r| r.is_object()) {
                    collect_listing(replies, batch);
                }
            }
            Some("more") => {
                if let Some(more) = more_from(data) {
                    batch.more.push(more);
                }
            }
            _ => {}
        }
    }
}

fn comment_from(data: &Value) -> Comment {
    Comment {
        author: author_or_missing(data.get("author").and_then(Value::as_str).map(String::from)),
        body: data
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        score: data.get("score").and_then(Value::as_i64).unwrap_or_default(),
        created_utc: data
            .get("created_utc")
            .and_then(Value::as_f64)
            .unwrap_or_default(),
        weighted_similarity: None,
    }
}

fn more_from(data: &Value) -> Option<MoreComments> {
    let parent_id = data.get("parent_id").and_then(Value::as_str)?.to_string();
    let children: Vec<String> = data
        .get("children")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    let count = data.get("count").and_then(Value::as_u64).unwrap_or_default();

    // an empty stub with no hidden replies carries nothing
    if children.is_empty() && count == 0 {
        return None;
    }
    Some(MoreComments { parent_id, children })
}
