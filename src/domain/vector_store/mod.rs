//! Vector store domain - collections of embedded points with payloads

mod store;

pub use store::{DistanceMetric, Payload, ScoredPoint, VectorPoint, VectorStore};
