// file: src/embedding/client.rs
// description: OpenAI-compatible embeddings API client
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::EmbeddingConfig;
use crate::embedding::embedder::TextEmbedder;
use crate::error::{RelevanceError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: Vec<&'a str>,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

pub struct OpenAiEmbeddingClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddingClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            RelevanceError::InvalidConfiguration(
                "embedding api_key is not set (OPENAI_API_KEY)".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            endpoint: embeddings_endpoint(&config.base_url),
            api_key,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }
}

fn embeddings_endpoint(base_url: &str) -> String {
    format!("{}/embeddings", base_url.trim_end_matches('/'))
}

#[async_trait]
impl TextEmbedder for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: vec![text],
            model: &self.model,
        };

        debug!(
            "Requesting embedding from {} for {} chars",
            self.model,
            text.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RelevanceError::EmbeddingUnavailable(format!(
                    "Failed to send embedding request: {}",
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RelevanceError::EmbeddingUnavailable(format!(
                "Embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            RelevanceError::EmbeddingUnavailable(format!(
                "Failed to parse embedding response: {}",
                e
            ))
        })?;

        match embedding_response.data.into_iter().next() {
            Some(embedding_data) => {
                debug!(
                    "Received embedding of dimension {}",
                    embedding_data.embedding.len()
                );
                Ok(embedding_data.embedding)
            }
            None => Err(RelevanceError::EmbeddingUnavailable(
                "No embedding data returned".to_string(),
            )),
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = EmbeddingConfig::default();
        let result = OpenAiEmbeddingClient::new(&config);
        assert!(matches!(
            result,
            Err(RelevanceError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        assert_eq!(
            embeddings_endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn test_request_shape() {
        let request = EmbeddingRequest {
            input: vec!["hello"],
            model: "text-embedding-3-small",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"][0], "hello");
        assert_eq!(json["model"], "text-embedding-3-small");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.5,-0.25]}],"model":"text-embedding-3-small"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.5, -0.25]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_embedding_unavailable() {
        let config = EmbeddingConfig {
            api_key: Some("test".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..EmbeddingConfig::default()
        };
        let client = OpenAiEmbeddingClient::new(&config).unwrap();
        let err = client.embed("text").await.unwrap_err();
        assert!(err.is_item_recoverable());
    }
}
