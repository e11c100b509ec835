//! Qdrant vector store over the REST API

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::vector_store::{DistanceMetric, Payload, ScoredPoint, VectorPoint, VectorStore};
use crate::infrastructure::llm::{HttpClientTrait, HttpMethod, is_status};

/// Payload key holding the caller's id when it is not a UUID
const POINT_KEY: &str = "point_key";

/// Configuration for the Qdrant store
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Qdrant accepts only unsigned integers or UUIDs as point ids.
///
/// Other ids are mapped to a UUID v5, so re-ingesting a chunk overwrites it.
pub fn point_id(id: &str) -> String {
    match Uuid::parse_str(id) {
        Ok(uuid) => uuid.to_string(),
        Err(_) => Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()).to_string(),
    }
}

/// Qdrant vector store
#[derive(Debug)]
pub struct QdrantVectorStore<C: HttpClientTrait> {
    client: C,
    config: QdrantConfig,
    /// Dimensions of collections seen by this process
    dimensions: RwLock<HashMap<String, usize>>,
}

impl<C: HttpClientTrait> QdrantVectorStore<C> {
    pub fn new(client: C, config: QdrantConfig) -> Self {
        Self {
            client,
            config,
            dimensions: RwLock::new(HashMap::new()),
        }
    }

    fn collection_url(&self, name: &str) -> String {
        format!("{}/collections/{}", self.config.url, name)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        match &self.config.api_key {
            Some(key) => vec![("api-key", key.as_str())],
            None => Vec::new(),
        }
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, DomainError> {
        self.client
            .send_json(method, url, self.headers(), body)
            .await
    }

    fn unavailable(action: &str, e: DomainError) -> DomainError {
        match e {
            DomainError::Provider { message, .. } => {
                DomainError::store_unavailable("qdrant", format!("Failed to {}: {}", action, message))
            }
            other => other,
        }
    }

    fn remember_dimension(&self, name: &str, dimension: usize) {
        if let Ok(mut dims) = self.dimensions.write() {
            dims.insert(name.to_string(), dimension);
        }
    }

    fn forget_dimension(&self, name: &str) {
        if let Ok(mut dims) = self.dimensions.write() {
            dims.remove(name);
        }
    }

    /// Dimension of an existing collection, `None` when absent
    async fn collection_dimension(&self, name: &str) -> Result<Option<usize>, DomainError> {
        if let Some(dim) = self
            .dimensions
            .read()
            .ok()
            .and_then(|dims| dims.get(name).copied())
        {
            return Ok(Some(dim));
        }

        let info = match self
            .send(HttpMethod::Get, &self.collection_url(name), None)
            .await
        {
            Ok(info) => info,
            Err(e) if is_status(&e, 404) => return Ok(None),
            Err(e) => return Err(Self::unavailable("read collection", e)),
        };

        let dimension = info["result"]["config"]["params"]["vectors"]["size"]
            .as_u64()
            .map(|d| d as usize)
            .ok_or_else(|| {
                DomainError::store_unavailable(
                    "qdrant",
                    format!("Collection '{}' has no single unnamed vector config", name),
                )
            })?;

        self.remember_dimension(name, dimension);
        Ok(Some(dimension))
    }

    async fn require_dimension(&self, name: &str, actual: usize) -> Result<(), DomainError> {
        match self.collection_dimension(name).await? {
            Some(expected) if expected != actual => {
                Err(DomainError::dimension_mismatch(name, expected, actual))
            }
            Some(_) => Ok(()),
            None => Err(DomainError::store_unavailable(
                "qdrant",
                format!("Collection '{}' not found", name),
            )),
        }
    }

    fn parse_point(point: &Value) -> Option<ScoredPoint> {
        let id = match &point["id"] {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let score = point["score"].as_f64()? as f32;

        let mut payload: Payload = match &point["payload"] {
            Value::Object(map) => map.clone(),
            _ => Payload::new(),
        };

        // Report the caller's id rather than the derived UUID
        let id = match payload.remove(POINT_KEY) {
            Some(Value::String(key)) => key,
            _ => id,
        };

        Some(ScoredPoint { id, score, payload })
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStore for QdrantVectorStore<C> {
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), DomainError> {
        if let Some(existing) = self.collection_dimension(name).await? {
            if existing != dimension {
                return Err(DomainError::dimension_mismatch(name, existing, dimension));
            }
            return Ok(());
        }

        let body = json!({
            "vectors": { "size": dimension, "distance": metric.to_string() }
        });

        match self
            .send(HttpMethod::Put, &self.collection_url(name), Some(&body))
            .await
        {
            Ok(_) => info!(collection = name, dimension, "Created Qdrant collection"),
            // Another process created it between our check and create
            Err(e) if e.is_already_exists() => {
                debug!(collection = name, "Qdrant collection already exists");
                self.forget_dimension(name);
                return match self.collection_dimension(name).await? {
                    Some(existing) if existing != dimension => {
                        Err(DomainError::dimension_mismatch(name, existing, dimension))
                    }
                    _ => Ok(()),
                };
            }
            Err(e) => return Err(Self::unavailable("create collection", e)),
        }

        self.remember_dimension(name, dimension);
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, DomainError> {
        Ok(self.collection_dimension(name).await?.is_some())
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), DomainError> {
        if points.is_empty() {
            return Ok(());
        }

        for point in &points {
            self.require_dimension(collection, point.vector.len()).await?;
        }

        let points: Vec<Value> = points
            .into_iter()
            .map(|p| {
                let qdrant_id = point_id(&p.id);
                let mut payload = p.payload;
                if qdrant_id != p.id {
                    payload.insert(POINT_KEY.to_string(), json!(p.id));
                }
                json!({ "id": qdrant_id, "vector": p.vector, "payload": payload })
            })
            .collect();

        let count = points.len();
        let url = format!("{}/points?wait=true", self.collection_url(collection));

        self.send(HttpMethod::Put, &url, Some(&json!({ "points": points })))
            .await
            .map_err(|e| Self::unavailable("upsert points", e))?;

        debug!(collection, count, "Upserted points");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        self.require_dimension(collection, vector.len()).await?;

        let mut body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
            "with_vector": false,
        });

        if let Some(threshold) = score_threshold {
            body["score_threshold"] = json!(threshold);
        }

        let url = format!("{}/points/search", self.collection_url(collection));
        let response = self
            .send(HttpMethod::Post, &url, Some(&body))
            .await
            .map_err(|e| Self::unavailable("search points", e))?;

        let mut results: Vec<ScoredPoint> = response["result"]
            .as_array()
            .map(|points| points.iter().filter_map(Self::parse_point).collect())
            .unwrap_or_default();

        // Qdrant already filters; repeat locally so the boundary is inclusive everywhere
        if let Some(threshold) = score_threshold {
            results.retain(|p| p.score >= threshold);
        }
        results.truncate(limit);

        Ok(results)
    }

    async fn drop_collection(&self, name: &str) -> Result<(), DomainError> {
        self.forget_dimension(name);

        match self
            .send(HttpMethod::Delete, &self.collection_url(name), None)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_status(&e, 404) => Ok(()),
            Err(e) => Err(Self::unavailable("drop collection", e)),
        }
    }

    async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        let url = format!("{}/collections", self.config.url);
        let response = self
            .send(HttpMethod::Get, &url, None)
            .await
            .map_err(|e| Self::unavailable("list collections", e))?;

        let mut names: Vec<String> = response["result"]["collections"]
            .as_array()
            .map(|cols| {
                cols.iter()
                    .filter_map(|c| c["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();

        Ok(names)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let url = format!("{}/collections", self.config.url);
        self.send(HttpMethod::Get, &url, None)
            .await
            .map(|_| ())
            .map_err(|e| Self::unavailable("reach Qdrant", e))
    }

    fn backend_name(&self) -> &'static str {
        "qdrant"
    }
}
