// file: src/reddit/mod.rs
// description: reddit collection module exports
// reference: internal module structure

pub mod client;
pub mod listing;
pub mod source;
pub mod throttle;

pub use client::RedditClient;
pub use source::{JsonFileSource, PostSource};
pub use throttle::ApiCallThrottle;
