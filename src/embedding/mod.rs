// file: src/embedding/mod.rs
// description: embedding providers and vector similarity
// reference: internal module structure

pub mod client;
pub mod embedder;
pub mod fallback;
pub mod similarity;

pub use client::OpenAiEmbeddingClient;
pub use embedder::TextEmbedder;
pub use fallback::FallbackEmbedder;
pub use similarity::cosine_similarity;
