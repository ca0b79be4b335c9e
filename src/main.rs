// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use subreddit_relevance::scoring::{BOOST_WEIGHT, PENALTY_WEIGHT};
use subreddit_relevance::utils::logging::{
    format_error, format_info, format_score, format_success, format_warning,
};
use subreddit_relevance::{
    Config, FallbackEmbedder, JsonExporter, JsonFileSource, OpenAiEmbeddingClient,
    OperationTimer, PipelineOrchestrator, QueryProfile, RedditClient, RelevancePipeline,
    RelevanceScorer, RunSummary, TextEmbedder, normalize,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "subreddit-relevance")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Score subreddit posts for relevance against a target query", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect posts from the configured subreddits, score them, and save the dataset
    Scrape {
        /// Override the configured subreddits (repeatable)
        #[arg(short, long = "subreddit", value_name = "NAME")]
        subreddits: Vec<String>,

        /// Stop after this many posts per subreddit
        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,

        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Also score every comment body
        #[arg(long)]
        score_comments: bool,

        /// Use the deterministic hash embedder instead of the embedding API
        #[arg(long)]
        offline: bool,
    },

    /// Rescore a previously saved dataset against the current query
    Rescore {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long)]
        score_comments: bool,

        #[arg(long)]
        offline: bool,
    },

    /// Print the score breakdown for a single text
    Score {
        text: String,

        #[arg(long)]
        offline: bool,
    },

    /// Validate and print the effective configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    subreddit_relevance::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Subreddit Relevance Scorer");
    info!("Loading configuration from: {}", cli.config.display());

    let path = if cli.config.exists() {
        Some(cli.config.as_path())
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        None
    };
    let config = Config::load(path).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scrape {
            subreddits,
            limit,
            output,
            score_comments,
            offline,
        } => {
            cmd_scrape(
                config,
                subreddits,
                limit,
                output,
                score_comments,
                offline,
                cli.color,
            )
            .await?;
        }
        Commands::Rescore {
            input,
            output,
            score_comments,
            offline,
        } => {
            cmd_rescore(config, input, output, score_comments, offline, cli.color).await?;
        }
        Commands::Score { text, offline } => {
            cmd_score(&config, &text, offline).await?;
        }
        Commands::CheckConfig => {
            cmd_check_config(&config)?;
        }
    }

    Ok(())
}

fn build_embedder(config: &Config, offline: bool) -> Result<Arc<dyn TextEmbedder>> {
    if offline {
        return Ok(Arc::new(FallbackEmbedder::new(config.embedding.dimensions)));
    }

    if config.embedding.api_key.is_none() {
        warn!("No embedding API key configured, using fallback embedding");
        return Ok(Arc::new(FallbackEmbedder::new(config.embedding.dimensions)));
    }

    info!("Using {} for embeddings", config.embedding.model);
    let client = OpenAiEmbeddingClient::new(&config.embedding)
        .context("Failed to create embedding client")?;
    Ok(Arc::new(client))
}

async fn build_scorer(config: &Config, offline: bool) -> Result<RelevanceScorer> {
    let embedder = build_embedder(config, offline)?;
    let profile = QueryProfile::from_config(&config.query, embedder.as_ref())
        .await
        .context("Failed to build query profile")?;
    Ok(RelevanceScorer::new(Arc::new(profile), embedder))
}

async fn cmd_scrape(
    mut config: Config,
    subreddits: Vec<String>,
    limit: Option<usize>,
    output: Option<PathBuf>,
    score_comments: bool,
    offline: bool,
    colored: bool,
) -> Result<()> {
    if !subreddits.is_empty() {
        config.reddit.subreddits = subreddits;
    }
    if limit.is_some() {
        config.reddit.post_limit = limit;
    }
    if let Some(output) = output {
        config.pipeline.output_dir = output;
    }
    config.pipeline.score_comments |= score_comments;
    config.validate().context("Invalid configuration")?;

    let reddit = RedditClient::new(&config.reddit).context("Failed to create Reddit client")?;
    let scorer = build_scorer(&config, offline).await?;
    let pipeline = RelevancePipeline::new(scorer, config.pipeline.parallel_workers);
    let exporter = JsonExporter::new(&config.pipeline.output_dir, config.pipeline.pretty)?;

    let timer = OperationTimer::new("scrape");
    let summary = PipelineOrchestrator::new(&pipeline, &exporter)
        .with_comment_scoring(config.pipeline.score_comments)
        .with_color(colored)
        .run(&reddit, &config.reddit.subreddits, "post")
        .await
        .context("Scrape failed")?;
    timer.finish_with_count(summary.stats.posts_seen());

    print_summary(&summary);
    Ok(())
}

async fn cmd_rescore(
    config: Config,
    input: PathBuf,
    output: Option<PathBuf>,
    score_comments: bool,
    offline: bool,
    colored: bool,
) -> Result<()> {
    let source = JsonFileSource::load(&input).context("Failed to load dataset")?;
    if source.is_empty() {
        println!("{}", format_warning("Dataset is empty, nothing to rescore"));
        return Ok(());
    }
    let subreddits = source.subreddits();

    let scorer = build_scorer(&config, offline).await?;
    let pipeline = RelevancePipeline::new(scorer, config.pipeline.parallel_workers);
    let exporter = JsonExporter::new(&config.pipeline.output_dir, config.pipeline.pretty)?;
    let orchestrator = PipelineOrchestrator::new(&pipeline, &exporter)
        .with_comment_scoring(config.pipeline.score_comments || score_comments)
        .with_color(colored);

    let timer = OperationTimer::new("rescore");
    let summary = match output {
        Some(path) => {
            let writer = exporter.open_at(path)?;
            orchestrator
                .run_into(&source, &subreddits, "rescored", writer)
                .await
        }
        None => orchestrator.run(&source, &subreddits, "rescored").await,
    }
    .context("Rescore failed")?;
    timer.finish_with_count(summary.stats.posts_seen());

    print_summary(&summary);
    Ok(())
}

async fn cmd_score(config: &Config, text: &str, offline: bool) -> Result<()> {
    let scorer = build_scorer(config, offline).await?;

    let breakdown = match scorer.score(text).await {
        Ok(breakdown) => breakdown,
        Err(e) => {
            println!("{}", format_error(&format!("Could not score text: {}", e)));
            return Err(e.into());
        }
    };

    println!("\nCleaned text: {}", normalize(text));
    println!("{}", "=".repeat(80));
    println!("  Similarity:    {:.4}", breakdown.similarity);
    println!(
        "  Penalty hits:  {} (-{:.1})",
        breakdown.penalty_hits,
        PENALTY_WEIGHT * breakdown.penalty_hits as f64
    );
    println!(
        "  Boost hits:    {} (+{:.1})",
        breakdown.boost_hits,
        BOOST_WEIGHT * breakdown.boost_hits as f64
    );
    println!("  Score:         {}", format_score(breakdown.score));
    println!("{}", "=".repeat(80));

    Ok(())
}

fn cmd_check_config(config: &Config) -> Result<()> {
    match config.validate() {
        Ok(()) => println!("{}", format_success("Configuration is valid")),
        Err(e) => {
            println!("{}", format_error(&e.to_string()));
            return Err(e.into());
        }
    }

    if config.reddit.client_id.is_none() || config.reddit.client_secret.is_none() {
        println!("{}", format_warning("Reddit credentials are not set"));
    }
    if config.embedding.api_key.is_none() {
        println!(
            "{}",
            format_warning("Embedding API key is not set; the fallback embedder will be used")
        );
    }

    println!("{}", render_config(config)?);
    Ok(())
}

fn render_config(config: &Config) -> Result<String> {
    serde_json::to_string_pretty(config).context("Failed to render configuration")
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "{}",
        format_success(&format!(
            "Scored {} posts ({} comments) in {}s",
            summary.stats.posts_scored, summary.stats.comments_scored, summary.stats.duration_secs
        ))
    );
    if !summary.failures.is_empty() {
        println!(
            "{}",
            format_warning(&format!("{} posts could not be scored:", summary.failures.len()))
        );
        for failure in &summary.failures {
            println!("    {}: {}", failure.id, failure.reason);
        }
    }
    println!("{}", format_info(&format!("Data: {}", summary.output.display())));
    println!(
        "{}",
        format_info(&format!("Manifest: {}", summary.manifest.display()))
    );
}
