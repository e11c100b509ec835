//! Cached answers stored in the semantic layer

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::vector_store::{Payload, ScoredPoint};

/// A previously generated answer keyed by its query embedding
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAnswer {
    query: String,
    response: String,
    created_at: DateTime<Utc>,
}

impl CachedAnswer {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            created_at: Utc::now(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("query".to_string(), json!(self.query));
        payload.insert("response".to_string(), json!(self.response));
        payload.insert("timestamp".to_string(), json!(self.created_at.to_rfc3339()));
        payload
    }

    /// Reads an answer back from a search hit; points without a response are ignored
    pub fn from_point(point: &ScoredPoint) -> Option<Self> {
        let response = point.payload_str("response")?;
        let query = point.payload_str("query").unwrap_or_default();
        let created_at = point
            .payload_str("timestamp")
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Some(Self {
            query: query.to_string(),
            response: response.to_string(),
            created_at,
        })
    }
}
