//! Infrastructure layer - Store adapters, providers and layer services

pub mod cache;
pub mod embedding;
pub mod generation;
pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod services;
pub mod vector_store;
