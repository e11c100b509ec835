//! Documents, chunks and retrieval results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::vector_store::{Payload, ScoredPoint};

const RESERVED_KEYS: [&str; 4] = ["parent_doc_id", "chunk_index", "total_chunks", "is_chunked"];

/// A document submitted for ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDocument {
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl NewDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Documents with only whitespace are skipped at ingest
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Metadata recorded on each stored chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub parent_doc_id: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub is_chunked: bool,
    /// Caller-supplied fields; never override the reserved keys above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChunkMetadata {
    pub fn for_chunk(
        parent_doc_id: impl Into<String>,
        chunk_index: usize,
        total_chunks: usize,
        caller_fields: &Map<String, Value>,
    ) -> Self {
        let extra = caller_fields
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            parent_doc_id: parent_doc_id.into(),
            chunk_index,
            total_chunks,
            is_chunked: total_chunks > 1,
            extra,
        }
    }
}

/// Logical chunk id: the document id itself when unsplit
pub fn chunk_id(doc_id: &str, index: usize, total: usize) -> String {
    if total > 1 {
        format!("{}_chunk_{}", doc_id, index)
    } else {
        doc_id.to_string()
    }
}

/// A chunk ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
    pub created_at: DateTime<Utc>,
}

impl DocumentChunk {
    /// Builds every chunk of one document from its split texts
    pub fn from_parts(doc_id: &str, parts: Vec<String>, caller_fields: &Map<String, Value>) -> Vec<Self> {
        let total = parts.len();
        let created_at = Utc::now();

        parts
            .into_iter()
            .enumerate()
            .map(|(index, content)| Self {
                id: chunk_id(doc_id, index, total),
                content,
                metadata: ChunkMetadata::for_chunk(doc_id, index, total, caller_fields),
                created_at,
            })
            .collect()
    }

    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("chunk_id".to_string(), json!(self.id));
        payload.insert("content".to_string(), json!(self.content));
        payload.insert(
            "metadata".to_string(),
            serde_json::to_value(&self.metadata).unwrap_or(Value::Null),
        );
        payload.insert("timestamp".to_string(), json!(self.created_at.to_rfc3339()));
        payload
    }
}

/// A ranked chunk returned by the retrieval layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub content: String,
    pub metadata: Map<String, Value>,
    pub score: f32,
}

impl RetrievalResult {
    /// Reads a stored chunk back; points without content are ignored
    pub fn from_point(point: ScoredPoint) -> Option<Self> {
        let content = point.payload_str("content")?.to_string();
        let metadata = match point.payload.get("metadata") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        Some(Self {
            content,
            metadata,
            score: point.score,
        })
    }

    pub fn parent_doc_id(&self) -> Option<&str> {
        self.metadata.get("parent_doc_id").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id() {
        assert_eq!(chunk_id("doc", 0, 1), "doc");
        assert_eq!(chunk_id("doc", 0, 3), "doc_chunk_0");
        assert_eq!(chunk_id("doc", 2, 3), "doc_chunk_2");
    }

    #[test]
    fn test_single_part_is_not_chunked() {
        let chunks = DocumentChunk::from_parts("d1", vec!["short".into()], &Map::new());

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "d1");
        assert!(!chunks[0].metadata.is_chunked);
        assert_eq!(chunks[0].metadata.total_chunks, 1);
    }

    #[test]
    fn test_multi_part_metadata() {
        let chunks = DocumentChunk::from_parts(
            "d1",
            vec!["a".into(), "b".into(), "c".into()],
            &Map::new(),
        );

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.parent_doc_id, "d1");
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, 3);
            assert!(chunk.metadata.is_chunked);
        }
    }

    #[test]
    fn test_caller_fields_cannot_override_reserved_keys() {
        let mut fields = Map::new();
        fields.insert("source".to_string(), json!("wiki"));
        fields.insert("parent_doc_id".to_string(), json!("forged"));

        let metadata = ChunkMetadata::for_chunk("real", 0, 1, &fields);
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["parent_doc_id"], "real");
        assert_eq!(json["source"], "wiki");
    }

    #[test]
    fn test_payload_round_trip_into_result() {
        let doc = NewDocument::new("Rust is a systems language").with_metadata("topic", "rust");
        let chunk = DocumentChunk::from_parts("d1", vec![doc.content.clone()], &doc.metadata)
            .remove(0);

        let point = ScoredPoint {
            id: "uuid".to_string(),
            score: 0.91,
            payload: chunk.to_payload(),
        };
        let result = RetrievalResult::from_point(point).unwrap();

        assert_eq!(result.content, "Rust is a systems language");
        assert_eq!(result.parent_doc_id(), Some("d1"));
        assert_eq!(result.metadata["topic"], "rust");
        assert_eq!(result.metadata["is_chunked"], false);
    }

    #[test]
    fn test_point_without_content_is_ignored() {
        let point = ScoredPoint {
            id: "x".to_string(),
            score: 0.9,
            payload: Payload::new(),
        };

        assert!(RetrievalResult::from_point(point).is_none());
    }

    #[test]
    fn test_blank_document() {
        assert!(NewDocument::new("  \n ").is_blank());
        assert!(!NewDocument::new("text").is_blank());
    }
}
