//! arXiv search client.
//!
//! Pipeline: optional Gemini query rewriting → arXiv Atom query → feed parsing →
//! optional Cohere reranking. [`ArxivClient`] wires the stages together; each
//! stage is also usable on its own.

pub mod arxiv;
pub mod client;
pub mod cohere;
pub mod config;
pub mod gemini;
pub mod rerank;
pub mod rewrite;

pub const USER_AGENT: &str = concat!("arxiv-scout/", env!("CARGO_PKG_VERSION"));

pub use arxiv::types::{QueryResult, RankedResult};
pub use client::{ArxivClient, QueryError, QueryOptions};
pub use config::{ApiKey, Config, ConfigError};
