//! Gemini embedding provider using text-embedding-004
//!
//! Embeddings are requested at a reduced output dimensionality. Truncated
//! vectors come back unnormalized, so every vector is L2-normalized here
//! before anything downstream sees it.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;

/// Texts per batchEmbedContents request, the API's documented limit
const API_BATCH_LIMIT: usize = 100;

/// Gemini embedding provider
pub struct GeminiEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    /// Create a new Gemini embedder from configuration
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Get the single-text API endpoint URL
    fn embed_endpoint(&self) -> String {
        format!(
            "{}/models/{}:embedContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Get the batch API endpoint URL
    fn batch_endpoint(&self) -> String {
        format!(
            "{}/models/{}:batchEmbedContents?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Check dimensionality and normalize a raw vector from the API
    fn finalize(&self, values: Vec<f32>) -> Result<Vec<f32>> {
        if values.len() != self.dimensions {
            return Err(Error::Embedding(format!(
                "Expected {} dimensions, got {}",
                self.dimensions,
                values.len()
            )));
        }
        Ok(l2_normalize(values))
    }
}

/// Scale a vector to unit length. A zero vector is returned unchanged.
fn l2_normalize(mut values: Vec<f32>) -> Vec<f32> {
    let norm = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in &mut values {
            *x /= norm;
        }
    }
    values
}

#[derive(serde::Serialize)]
struct EmbedRequest {
    content: Content,
    #[serde(rename = "outputDimensionality")]
    output_dimensionality: usize,
}

#[derive(serde::Serialize)]
struct BatchEmbedRequest {
    requests: Vec<BatchEmbedItem>,
}

#[derive(serde::Serialize)]
struct BatchEmbedItem {
    /// Fully qualified model name, e.g. "models/text-embedding-004"
    model: String,
    content: Content,
    #[serde(rename = "outputDimensionality")]
    output_dimensionality: usize,
}

#[derive(serde::Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(serde::Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(serde::Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::Embedding("Cannot embed empty text".to_string()));
        }

        let request = EmbedRequest {
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
            output_dimensionality: self.dimensions,
        };

        let response = self
            .client
            .post(self.embed_endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Gemini embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Gemini embedding failed ({}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse Gemini response: {}", e)))?;

        self.finalize(embed_response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(empty) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(Error::Embedding(format!(
                "Cannot embed empty text (batch position {})",
                empty
            )));
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(API_BATCH_LIMIT) {
            let request = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|text| BatchEmbedItem {
                        model: format!("models/{}", self.model),
                        content: Content {
                            parts: vec![Part { text: text.clone() }],
                        },
                        output_dimensionality: self.dimensions,
                    })
                    .collect(),
            };

            let response = self
                .client
                .post(self.batch_endpoint())
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    Error::Embedding(format!("Gemini batch embedding request failed: {}", e))
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Embedding(format!(
                    "Gemini batch embedding failed ({}): {}",
                    status, body
                )));
            }

            let batch_response: BatchEmbedResponse = response.json().await.map_err(|e| {
                Error::Embedding(format!("Failed to parse Gemini batch response: {}", e))
            })?;

            if batch_response.embeddings.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    batch_response.embeddings.len()
                )));
            }

            for embedding in batch_response.embeddings {
                all_embeddings.push(self.finalize(embedding.values)?);
            }
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "gemini-embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize_unit_length() {
        let normalized = l2_normalize(vec![3.0, 4.0]);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);

        let norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_preserves_direction() {
        let normalized = l2_normalize(vec![-2.0, 0.0, 2.0]);
        assert!(normalized[0] < 0.0);
        assert_eq!(normalized[1], 0.0);
        assert!(normalized[2] > 0.0);
    }

    #[test]
    fn test_l2_normalize_zero_vector_unchanged() {
        assert_eq!(l2_normalize(vec![0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_embed_request_wire_format() {
        let request = EmbedRequest {
            content: Content {
                parts: vec![Part {
                    text: "hello".to_string(),
                }],
            },
            output_dimensionality: 256,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["outputDimensionality"], 256);
        assert_eq!(json["content"]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_batch_request_carries_model_per_item() {
        let request = BatchEmbedRequest {
            requests: vec![BatchEmbedItem {
                model: "models/text-embedding-004".to_string(),
                content: Content {
                    parts: vec![Part {
                        text: "hello".to_string(),
                    }],
                },
                output_dimensionality: 256,
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requests"][0]["model"], "models/text-embedding-004");
    }
}
