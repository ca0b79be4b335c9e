// file: src/reddit/client.rs
// description: application-only reddit api client that pages through new posts
// reference: https://github.com/reddit-archive/reddit/wiki/OAuth2

use crate::config::RedditConfig;
use crate::error::{RelevanceError, Result};
use crate::models::post::{Comment, RedditPost};
use crate::reddit::listing::{
    CommentBatch, Listing, MoreComments, PostData, flatten_comments, flatten_continuation,
    flatten_more_children,
};
use crate::reddit::source::PostSource;
use crate::reddit::throttle::ApiCallThrottle;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";
const PAGE_SIZE: &str = "100";
const COMMENT_LIMIT: &str = "500";
/// Most ids `/api/morechildren` accepts in one request.
const MORE_CHILDREN_BATCH: usize = 100;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

enum PageCursor {
    Start,
    After(String),
    Done,
}

pub struct RedditClient {
    http: Client,
    client_id: String,
    client_secret: String,
    user_agent: String,
    token: Mutex<Option<AccessToken>>,
    throttle: ApiCallThrottle,
    post_limit: Option<usize>,
}

impl RedditClient {
    pub fn new(config: &RedditConfig) -> Result<Self> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RelevanceError::InvalidConfiguration(format!("{} is not set", name)))
        };

        Ok(Self {
            http: Client::builder().timeout(Duration::from_secs(30)).build()?,
            client_id: require(&config.client_id, "REDDIT_CLIENT_ID")?,
            client_secret: require(&config.client_secret, "REDDIT_CLIENT_SECRET")?,
            user_agent: require(&config.user_agent, "REDDIT_USER_AGENT")?,
            token: Mutex::new(None),
            throttle: ApiCallThrottle::new(
                config.api_call_limit,
                Duration::from_secs(config.pause_secs),
            ),
            post_limit: config.post_limit,
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        if let Some(current) = token.as_ref() {
            if Instant::now() + TOKEN_REFRESH_MARGIN < current.expires_at {
                return Ok(current.value.clone());
            }
        }

        debug!("Requesting Reddit access token");
        let response = self
            .http
            .post(AUTH_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(USER_AGENT, &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RelevanceError::Reddit(format!(
                "token request failed with status {}",
                response.status()
            )));
        }

        let body: TokenResponse = response.json().await?;
        let value = body.access_token.clone();
        *token = Some(AccessToken {
            value: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        });
        Ok(value)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}{}", API_URL, path))
            .bearer_auth(token)
            .header(USER_AGENT, &self.user_agent)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RelevanceError::Reddit(format!(
                "GET {} failed with status {}",
                path,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// One page of `/r/{subreddit}/new`, newest first, plus the cursor of the next page.
    pub async fn fetch_page(
        &self,
        subreddit: &str,
        after: Option<&str>,
    ) -> Result<(Vec<PostData>, Option<String>)> {
        let mut query = vec![("limit", PAGE_SIZE), ("raw_json", "1")];
        if let Some(after) = after {
            query.push(("after", after));
        }

        let body = self
            .get_json(&format!("/r/{}/new", subreddit), &query)
            .await?;
        let listing: Listing<PostData> = serde_json::from_value(body)?;

        let posts: Vec<PostData> = listing
            .data
            .children
            .into_iter()
            .filter(|thing| thing.kind == "t3")
            .map(|thing| thing.data)
            .collect();

        debug!("Fetched {} posts from r/{}", posts.len(), subreddit);
        Ok((posts, listing.data.after))
    }

    /// The whole comment tree of a post, with every `more` stub expanded.
    ///
    /// Comments revealed by an expansion are appended after the ones already
    /// read. A failed expansion is logged and skipped.
    pub async fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let body = self
            .get_json(
                &format!("/comments/{}", post_id),
                &[("limit", COMMENT_LIMIT), ("raw_json", "1")],
            )
            .await?;
        let CommentBatch { mut comments, more } = flatten_comments(&body);

        let mut pending: VecDeque<MoreComments> = more.into();
        let mut requested: HashSet<String> = HashSet::new();

        while let Some(stub) = pending.pop_front() {
            let expansions = if stub.is_continuation() {
                match stub.parent_comment() {
                    Some(parent) if requested.insert(format!("t1_{}", parent)) => {
                        vec![self.fetch_continuation(post_id, parent).await]
                    }
                    _ => continue,
                }
            } else {
                let fresh: Vec<String> = stub
                    .children
                    .into_iter()
                    .filter(|id| requested.insert(id.clone()))
                    .collect();
                let mut results = Vec::new();
                for batch in children_batches(&fresh) {
                    results.push(self.fetch_more_children(post_id, &batch).await);
                }
                results
            };

            for expansion in expansions {
                match expansion {
                    Ok(batch) => {
                        comments.extend(batch.comments);
                        pending.extend(batch.more);
                    }
                    Err(e) => warn!("Failed to expand comments of {}: {}", post_id, e),
                }
            }
        }

        Ok(comments)
    }

    async fn fetch_more_children(&self, post_id: &str, children: &str) -> Result<CommentBatch> {
        let link_id = format!("t3_{}", post_id);
        let body = self
            .get_json(
                "/api/morechildren",
                &[
                    ("api_type", "json"),
                    ("link_id", link_id.as_str()),
                    ("children", children),
                    ("limit_children", "false"),
                    ("raw_json", "1"),
                ],
            )
            .await;
        self.throttle.record_call().await;
        Ok(flatten_more_children(&body?))
    }

    async fn fetch_continuation(&self, post_id: &str, parent: &str) -> Result<CommentBatch> {
        let body = self
            .get_json(
                &format!("/comments/{}", post_id),
                &[("comment", parent), ("limit", COMMENT_LIMIT), ("raw_json", "1")],
            )
            .await;
        self.throttle.record_call().await;
        Ok(flatten_continuation(&body?))
    }

    async fn complete_post(&self, data: PostData) -> RedditPost {
        let comments = match self.fetch_comments(&data.id).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!("Failed to load comments for {}: {}", data.id, e);
                Vec::new()
            }
        };
        self.throttle.record_call().await;
        data.into_post(comments)
    }
}

/// Comma-joined id lists of at most [`MORE_CHILDREN_BATCH`] ids each.
fn children_batches(ids: &[String]) -> Vec<String> {
    ids.chunks(MORE_CHILDREN_BATCH)
        .map(|chunk| chunk.join(","))
        .collect()
}

impl PostSource for RedditClient {
    fn posts<'a>(&'a self, subreddit: &'a str) -> BoxStream<'a, Result<RedditPost>> {
        info!("Fetching posts from r/{}...", subreddit);

        let pages = stream::try_unfold(PageCursor::Start, move |cursor| async move {
            let after = match cursor {
                PageCursor::Start => None,
                PageCursor::After(after) => Some(after),
                PageCursor::Done => return Ok(None),
            };

            let (page, next) = self.fetch_page(subreddit, after.as_deref()).await?;
            let cursor = match next {
                Some(next) if !page.is_empty() => PageCursor::After(next),
                _ => PageCursor::Done,
            };
            Ok::<_, RelevanceError>(Some((page, cursor)))
        });

        let posts = pages
            .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, RelevanceError>)))
            .try_flatten()
            .and_then(move |data| async move { Ok(self.complete_post(data).await) });

        match self.post_limit {
            Some(limit) => posts.take(limit).boxed(),
            None => posts.boxed(),
        }
    }
}
