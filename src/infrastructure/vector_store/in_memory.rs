//! In-memory vector store using linear search
//!
//! Suitable for development, tests and single-process deployments.
//! For anything shared between processes, use Qdrant.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::embedding::cosine_similarity;
use crate::domain::vector_store::{DistanceMetric, ScoredPoint, VectorPoint, VectorStore};

#[derive(Debug)]
struct Collection {
    dimension: usize,
    metric: DistanceMetric,
    points: HashMap<String, VectorPoint>,
}

impl Collection {
    fn check_dimension(&self, name: &str, actual: usize) -> Result<(), DomainError> {
        if actual != self.dimension {
            return Err(DomainError::dimension_mismatch(name, self.dimension, actual));
        }
        Ok(())
    }

    /// Score with "higher is better" semantics for every metric
    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.metric {
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::Dot => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            DistanceMetric::Euclid => -a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }
}

/// Process-local vector store
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points in a collection, if it exists
    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.points.len())
    }

    fn missing(name: &str) -> DomainError {
        DomainError::store_unavailable("in_memory", format!("Collection '{}' not found", name))
    }

    fn lock_error(e: impl std::fmt::Display) -> DomainError {
        DomainError::internal(format!("Failed to acquire lock: {}", e))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), DomainError> {
        let mut collections = self.collections.write().map_err(Self::lock_error)?;

        match collections.get(name) {
            Some(existing) => existing.check_dimension(name, dimension),
            None => {
                collections.insert(
                    name.to_string(),
                    Collection {
                        dimension,
                        metric,
                        points: HashMap::new(),
                    },
                );
                Ok(())
            }
        }
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, DomainError> {
        let collections = self.collections.read().map_err(Self::lock_error)?;
        Ok(collections.contains_key(name))
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), DomainError> {
        let mut collections = self.collections.write().map_err(Self::lock_error)?;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| Self::missing(collection))?;

        // Validate the whole batch before writing any of it
        for point in &points {
            target.check_dimension(collection, point.vector.len())?;
        }

        for point in points {
            target.points.insert(point.id.clone(), point);
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        let collections = self.collections.read().map_err(Self::lock_error)?;
        let target = collections
            .get(collection)
            .ok_or_else(|| Self::missing(collection))?;

        target.check_dimension(collection, vector.len())?;

        let mut results: Vec<ScoredPoint> = target
            .points
            .values()
            .map(|point| ScoredPoint {
                id: point.id.clone(),
                score: target.score(vector, &point.vector),
                payload: point.payload.clone(),
            })
            .filter(|p| score_threshold.is_none_or(|t| p.score >= t))
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn drop_collection(&self, name: &str) -> Result<(), DomainError> {
        let mut collections = self.collections.write().map_err(Self::lock_error)?;
        collections.remove(name);
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, DomainError> {
        let collections = self.collections.read().map_err(Self::lock_error)?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}
