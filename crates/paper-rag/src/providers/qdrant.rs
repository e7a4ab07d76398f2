//! Qdrant vector index over the HTTP API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use uuid::Uuid;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::providers::vector_index::VectorIndexProvider;
use crate::retrieval::filter::{fields, Filter};
use crate::types::{ChunkPayload, VectorHit, VectorRecord};

/// Points per upsert request
const UPSERT_BATCH_SIZE: usize = 100;

/// Qdrant collection client
pub struct QdrantIndex {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    api_key: Option<String>,
}

impl QdrantIndex {
    /// Create a new Qdrant index client from configuration
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Get the collection URL
    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Attach the API key header when one is configured
    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    /// Fetch the collection's configured dimensionality, or None when the
    /// collection does not exist
    async fn collection_dimensions(&self) -> Result<Option<usize>> {
        let response = self
            .authed(self.client.get(self.collection_url()))
            .send()
            .await
            .map_err(|e| Error::Retrieval(format!("Qdrant request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval(format!(
                "Qdrant collection lookup failed ({}): {}",
                status, body
            )));
        }

        let info: CollectionInfoResponse = response
            .json()
            .await
            .map_err(|e| Error::Retrieval(format!("Failed to parse Qdrant response: {}", e)))?;

        Ok(Some(info.result.config.params.vectors.size))
    }

    /// Create the collection with cosine distance
    async fn create_collection(&self, dimensions: usize) -> Result<()> {
        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: dimensions,
                distance: "Cosine".to_string(),
            },
        };

        let response = self
            .authed(self.client.put(self.collection_url()))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Retrieval(format!("Qdrant request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval(format!(
                "Qdrant collection creation failed ({}): {}",
                status, body
            )));
        }
        Ok(())
    }

    /// Index a payload field so scope filters stay fast as the collection grows
    async fn create_payload_index(&self, field_name: &str, field_schema: &str) -> Result<()> {
        let request = CreatePayloadIndexRequest {
            field_name: field_name.to_string(),
            field_schema: field_schema.to_string(),
        };

        let response = self
            .authed(self.client.put(format!("{}/index", self.collection_url())))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Retrieval(format!("Qdrant request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval(format!(
                "Qdrant payload index on '{}' failed ({}): {}",
                field_name, status, body
            )));
        }
        Ok(())
    }
}

/// Translate a filter into Qdrant's filter JSON. Conditions always sit
/// under a `must` clause; nested conjunctions become nested filters.
fn filter_to_json(filter: &Filter) -> serde_json::Value {
    match filter {
        Filter::And(filters) => serde_json::json!({
            "must": filters.iter().map(condition_to_json).collect::<Vec<_>>(),
        }),
        other => serde_json::json!({
            "must": [condition_to_json(other)],
        }),
    }
}

fn condition_to_json(filter: &Filter) -> serde_json::Value {
    match filter {
        Filter::Eq(field, value) => serde_json::json!({
            "key": field,
            "match": { "value": value },
        }),
        Filter::In(field, values) => serde_json::json!({
            "key": field,
            "match": { "any": values },
        }),
        Filter::And(filters) => serde_json::json!({
            "must": filters.iter().map(condition_to_json).collect::<Vec<_>>(),
        }),
    }
}

#[derive(serde::Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(serde::Serialize)]
struct VectorParams {
    size: usize,
    distance: String,
}

#[derive(serde::Serialize)]
struct CreatePayloadIndexRequest {
    field_name: String,
    field_schema: String,
}

#[derive(serde::Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(serde::Deserialize)]
struct CollectionInfo {
    config: CollectionConfig,
}

#[derive(serde::Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(serde::Deserialize)]
struct CollectionParams {
    vectors: VectorParamsInfo,
}

#[derive(serde::Deserialize)]
struct VectorParamsInfo {
    size: usize,
}

#[derive(serde::Serialize)]
struct UpsertRequest {
    points: Vec<PointStruct>,
}

#[derive(serde::Serialize)]
struct PointStruct {
    id: Uuid,
    vector: Vec<f32>,
    payload: ChunkPayload,
}

#[derive(serde::Serialize)]
struct SearchRequest {
    vector: Vec<f32>,
    limit: usize,
    filter: serde_json::Value,
    with_payload: bool,
}

#[derive(serde::Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(serde::Deserialize)]
struct ScoredPoint {
    score: f32,
    payload: Option<ChunkPayload>,
}

#[derive(serde::Serialize)]
struct DeleteRequest {
    filter: serde_json::Value,
}

#[async_trait]
impl VectorIndexProvider for QdrantIndex {
    async fn ensure_ready(&self, dimensions: usize) -> Result<()> {
        if let Some(existing) = self.collection_dimensions().await? {
            if existing != dimensions {
                return Err(Error::Config(format!(
                    "Collection '{}' stores {}-dimensional vectors, embedder produces {}",
                    self.collection, existing, dimensions
                )));
            }
            return Ok(());
        }

        tracing::info!(
            "Creating Qdrant collection '{}' ({} dimensions)",
            self.collection,
            dimensions
        );

        if let Err(create_err) = self.create_collection(dimensions).await {
            // A concurrent request may have created it first. Creation only
            // failed for real if the collection still does not exist.
            match self.collection_dimensions().await? {
                Some(existing) if existing == dimensions => return Ok(()),
                Some(existing) => {
                    return Err(Error::Config(format!(
                        "Collection '{}' stores {}-dimensional vectors, embedder produces {}",
                        self.collection, existing, dimensions
                    )))
                }
                None => return Err(create_err),
            }
        }

        self.create_payload_index(fields::OWNER_ID, "keyword").await?;
        self.create_payload_index(fields::DOCUMENT_ID, "keyword").await?;
        self.create_payload_index(fields::CHUNK_INDEX, "integer").await?;

        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut written = 0usize;
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let request = UpsertRequest {
                points: batch
                    .iter()
                    .map(|record| PointStruct {
                        id: record.id,
                        vector: record.vector.clone(),
                        payload: record.payload.clone(),
                    })
                    .collect(),
            };

            let response = self
                .authed(
                    self.client
                        .put(format!("{}/points?wait=true", self.collection_url())),
                )
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::Retrieval(format!("Qdrant upsert request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Retrieval(format!(
                    "Qdrant upsert failed ({}): {}",
                    status, body
                )));
            }

            written += batch.len();
        }

        Ok(written)
    }

    async fn query(
        &self,
        vector: &[f32],
        filter: &Filter,
        top_k: usize,
    ) -> Result<Vec<VectorHit>> {
        let request = SearchRequest {
            vector: vector.to_vec(),
            limit: top_k,
            filter: filter_to_json(filter),
            with_payload: true,
        };

        let response = self
            .authed(
                self.client
                    .post(format!("{}/points/search", self.collection_url())),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Retrieval(format!("Qdrant search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval(format!(
                "Qdrant search failed ({}): {}",
                status, body
            )));
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Retrieval(format!("Failed to parse Qdrant response: {}", e)))?;

        search_response
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload.ok_or_else(|| {
                    Error::Retrieval("Qdrant returned a point without payload".to_string())
                })?;
                Ok(VectorHit {
                    similarity: point.score,
                    payload,
                })
            })
            .collect()
    }

    async fn delete_by_filter(&self, filter: &Filter) -> Result<()> {
        let request = DeleteRequest {
            filter: filter_to_json(filter),
        };

        let response = self
            .authed(
                self.client
                    .post(format!("{}/points/delete?wait=true", self.collection_url())),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Retrieval(format!("Qdrant delete request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval(format!(
                "Qdrant delete failed ({}): {}",
                status, body
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
