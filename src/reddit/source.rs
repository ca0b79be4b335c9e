// file: src/reddit/source.rs
// description: collection stage abstraction and the on-disk dataset source

use crate::error::{RelevanceError, Result};
use crate::models::post::{PostRecord, RedditPost};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// Yields posts of one subreddit, one at a time.
pub trait PostSource: Send + Sync {
    fn posts<'a>(&'a self, subreddit: &'a str) -> BoxStream<'a, Result<RedditPost>>;
}

/// A dataset previously written by the exporter, read back for rescoring.
pub struct JsonFileSource {
    posts: Vec<RedditPost>,
}

impl JsonFileSource {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| RelevanceError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

        let records: BTreeMap<String, PostRecord> = serde_json::from_str(&contents)?;
        let posts: Vec<RedditPost> = records
            .into_iter()
            .map(|(id, record)| record.into_post(id))
            .collect();

        info!("Loaded {} posts from {}", posts.len(), path.display());
        Ok(Self { posts })
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Distinct subreddits present in the dataset, sorted.
    pub fn subreddits(&self) -> Vec<String> {
        self.posts
            .iter()
            .map(|p| p.subreddit.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl PostSource for JsonFileSource {
    fn posts<'a>(&'a self, subreddit: &'a str) -> BoxStream<'a, Result<RedditPost>> {
        stream::iter(
            self.posts
                .iter()
                .filter(move |p| p.subreddit == subreddit)
                .cloned()
                .map(Ok),
        )
        .boxed()
    }
}
