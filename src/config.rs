// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{RelevanceError, Result};
use crate::utils::validation::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
pub const DEFAULT_API_CALL_LIMIT: usize = 100;
pub const DEFAULT_PAUSE_SECS: u64 = 65;

pub const DEFAULT_QUERY: &str = "I am looking for personal experiences in clinical trials or interest in joining one.
I am interested in learning more about the process of clinical trials and how they work, how to find and participate in clinical trials.
medicine, research, study, trials, drug, treatment, experimental, patient, clinical, health, participation, patient recruitment
Looking for patient recruitment";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub reddit: RedditConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    pub query: QueryConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedditConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub subreddits: Vec<String>,
    #[serde(default = "default_api_call_limit")]
    pub api_call_limit: usize,
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
    #[serde(default)]
    pub post_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// The target query and its lexical adjustments. Every field is required.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    pub defined_query: String,
    pub penalty_keywords: Vec<String>,
    pub boost_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_parallel_workers")]
    pub parallel_workers: usize,
    #[serde(default)]
    pub score_comments: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_api_call_limit() -> usize {
    DEFAULT_API_CALL_LIMIT
}

fn default_pause_secs() -> u64 {
    DEFAULT_PAUSE_SECS
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_embedding_dimensions() -> usize {
    DEFAULT_EMBEDDING_DIMENSIONS
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_parallel_workers() -> usize {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_pretty() -> bool {
    true
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_workers: default_parallel_workers(),
            score_comments: false,
            output_dir: default_output_dir(),
            pretty: default_pretty(),
        }
    }
}

impl Config {
    /// Layers `SUBREDDIT_RELEVANCE__*` variables over `path`, or over
    /// [`Config::default_config`] when no file is given, then validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            let defaults = config::Config::try_from(&Self::default_config())
                .map_err(|e| RelevanceError::InvalidConfiguration(e.to_string()))?;
            builder = builder.add_source(defaults);
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SUBREDDIT_RELEVANCE")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("reddit.subreddits")
                .with_list_parse_key("query.penalty_keywords")
                .with_list_parse_key("query.boost_keywords")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| RelevanceError::InvalidConfiguration(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| RelevanceError::InvalidConfiguration(e.to_string()))?;

        config.apply_env_fallbacks();
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            reddit: RedditConfig {
                client_id: None,
                client_secret: None,
                user_agent: None,
                subreddits: vec!["clinicalresearch".to_string(), "clinicaltrials".to_string()],
                api_call_limit: DEFAULT_API_CALL_LIMIT,
                pause_secs: DEFAULT_PAUSE_SECS,
                post_limit: None,
            },
            embedding: EmbeddingConfig::default(),
            query: QueryConfig {
                defined_query: DEFAULT_QUERY.to_string(),
                penalty_keywords: [
                    "career",
                    "hiring",
                    "job",
                    "employment",
                    "work experience",
                    "cv",
                    "resume",
                    "intern",
                    "internship",
                    "cro",
                    "cra",
                ]
                .iter()
                .map(|k| k.to_string())
                .collect(),
                boost_keywords: ["patient", "participation", "recruitment", "trial", "treatment"]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
            },
            pipeline: PipelineConfig::default(),
        }
    }

    /// Credentials may live in the unprefixed variables used by other Reddit tooling.
    pub fn apply_env_fallbacks(&mut self) {
        fill_from_env(&mut self.reddit.client_id, "REDDIT_CLIENT_ID");
        fill_from_env(&mut self.reddit.client_secret, "REDDIT_CLIENT_SECRET");
        fill_from_env(&mut self.reddit.user_agent, "REDDIT_USER_AGENT");
        fill_from_env(&mut self.embedding.api_key, "OPENAI_API_KEY");
    }

    pub fn validate(&self) -> Result<()> {
        Validator::validate_query_text(&self.query.defined_query)?;
        Validator::validate_keywords("penalty_keywords", &self.query.penalty_keywords)?;
        Validator::validate_keywords("boost_keywords", &self.query.boost_keywords)?;

        if self.reddit.subreddits.is_empty() {
            return Err(RelevanceError::InvalidConfiguration(
                "at least one subreddit is required".to_string(),
            ));
        }
        for name in &self.reddit.subreddits {
            Validator::validate_subreddit_name(name)?;
        }

        if self.reddit.api_call_limit == 0 {
            return Err(RelevanceError::InvalidConfiguration(
                "api_call_limit must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.parallel_workers == 0 {
            return Err(RelevanceError::InvalidConfiguration(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(RelevanceError::InvalidConfiguration(
                "embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Validator::validate_url(&self.embedding.base_url)?;

        Ok(())
    }
}

fn fill_from_env(slot: &mut Option<String>, var: &str) {
    if slot.as_deref().is_none_or(str::is_empty) {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                *slot = Some(value);
            }
        }
    }
}
