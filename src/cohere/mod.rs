//! Cohere Rerank client.

pub mod client;
pub mod types;

pub use client::{CohereClient, CohereError, DEFAULT_MODEL, Reranker};
pub use types::{RerankDocument, RerankHit};
