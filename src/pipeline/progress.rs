// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for pipeline execution
// reference: uses indicatif for progress spinners and tracks scoring metrics

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub posts_scored: usize,
    pub posts_failed: usize,
    pub comments_scored: usize,
    pub duration_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts_seen(&self) -> usize {
        self.posts_scored + self.posts_failed
    }

    pub fn posts_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.posts_seen() as f64 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.posts_seen();
        if total == 0 {
            return 0.0;
        }
        (self.posts_scored as f64 / total as f64) * 100.0
    }
}

/// Spinner plus counters. The total is unknown up front because posts arrive
/// page by page.
pub struct ProgressTracker {
    bar: ProgressBar,
    posts_scored: AtomicUsize,
    posts_failed: AtomicUsize,
    comments_scored: AtomicUsize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::with_color(true)
    }

    pub fn with_color(colored: bool) -> Self {
        Self {
            bar: create_spinner(colored),
            posts_scored: AtomicUsize::new(0),
            posts_failed: AtomicUsize::new(0),
            comments_scored: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn inc_posts_scored(&self) {
        self.posts_scored.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
        self.update_message();
    }

    pub fn inc_posts_failed(&self) {
        self.posts_failed.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
        self.update_message();
    }

    pub fn add_comments_scored(&self, count: usize) {
        self.comments_scored.fetch_add(count, Ordering::SeqCst);
    }

    pub fn set_prefix(&self, prefix: String) {
        self.bar.set_prefix(prefix);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            posts_scored: self.posts_scored.load(Ordering::SeqCst),
            posts_failed: self.posts_failed.load(Ordering::SeqCst),
            comments_scored: self.comments_scored.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_message(&self) {
        let message = format!(
            "Scored: {} | Failed: {}",
            self.posts_scored.load(Ordering::SeqCst),
            self.posts_failed.load(Ordering::SeqCst)
        );
        self.bar.set_message(message);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_spinner(colored: bool) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] {prefix:.cyan.bold} {pos} posts {msg}"
    } else {
        "{spinner} [{elapsed_precise}] {prefix} {pos} posts {msg}"
    };
    bar.set_style(
        ProgressStyle::default_spinner()
            .template(template)
            .expect("Failed to create spinner template"),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
