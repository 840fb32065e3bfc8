use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiErrorBody, RANK_FIELD, RerankDocument, RerankHit, RerankRequest, RerankResponse};
use crate::config::ApiKey;

const API_BASE: &str = "https://api.cohere.com/v1";
pub const DEFAULT_MODEL: &str = "rerank-english-v3.0";

#[derive(Debug, thiserror::Error)]
pub enum CohereError {
    #[error("COHERE_API_KEY not set. Get one at https://dashboard.cohere.com/api-keys")]
    ApiKeyNotSet,

    #[error("Cohere rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Cohere API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Semantic relevance scoring of documents against a query.
/// Implemented by `CohereClient` for production; fakes are used in tests.
#[allow(async_fn_in_trait)]
pub trait Reranker {
    /// Scores up to `top_n` of `documents`; hits refer to positions in `documents`.
    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument<'_>],
        top_n: usize,
    ) -> Result<Vec<RerankHit>, CohereError>;
}

#[derive(Clone)]
pub struct CohereClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl CohereClient {
    pub fn new(http: Client, api_key: ApiKey, model: &str) -> Result<Self, CohereError> {
        if api_key.expose().trim().is_empty() {
            return Err(CohereError::ApiKeyNotSet);
        }
        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Reranker for CohereClient {
    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument<'_>],
        top_n: usize,
    ) -> Result<Vec<RerankHit>, CohereError> {
        let url = format!("{}/rerank", self.base_url);
        let request = RerankRequest {
            model: &self.model,
            query,
            documents,
            rank_fields: [RANK_FIELD],
            top_n,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Cohere API rate limited");
            return Err(CohereError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(ApiErrorBody {
                    message: Some(message),
                }) => message,
                _ => {
                    let end = text.floor_char_boundary(200);
                    format!("HTTP {status}: {}", &text[..end])
                }
            };
            warn!(status = %status, %message, "Cohere API error");
            return Err(CohereError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: RerankResponse = response.json().await?;
        debug!(
            model = %self.model,
            documents = documents.len(),
            hits = body.results.len(),
            "cohere rerank complete"
        );
        Ok(body.results)
    }
}
