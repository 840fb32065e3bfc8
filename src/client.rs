use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::arxiv::types::{QueryResult, RankedResult};
use crate::arxiv::{self, ArxivError};
use crate::cohere::{CohereClient, CohereError, Reranker};
use crate::config::Config;
use crate::gemini::{GeminiClient, GeminiError, TextGenerator};
use crate::rerank::{RerankError, rerank};
use crate::rewrite::{RewriteError, rewrite_query};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error(transparent)]
    Cohere(#[from] CohereError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Arxiv(#[from] ArxivError),

    #[error(transparent)]
    Rerank(#[from] RerankError),
}

/// Paging and stage toggles for [`ArxivClient::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub start: usize,
    pub max_results: usize,
    pub top_n: usize,
    /// Rewrite the query with the text generator; otherwise it is sent as-is.
    pub rewrite: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            start: 0,
            max_results: 100,
            top_n: 100,
            rewrite: true,
        }
    }
}

/// arXiv search pipeline: rewrite → fetch → parse → rerank.
///
/// One `reqwest::Client` is shared by the arXiv fetch and both providers.
/// Transport failures of the arXiv request are logged and reported as
/// `Ok(None)`; `Ok(Some(vec![]))` always means the feed had no entries.
#[derive(Clone)]
pub struct ArxivClient<G = GeminiClient, R = CohereClient> {
    http: Client,
    base_url: String,
    generator: G,
    reranker: R,
}

impl ArxivClient {
    pub fn new(config: Config) -> Result<Self, QueryError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.http_timeout)
            .build()
            .map_err(QueryError::HttpClient)?;
        let generator =
            GeminiClient::new(http.clone(), config.gemini_api_key, &config.gemini_model)?;
        let reranker = CohereClient::new(http.clone(), config.cohere_api_key, &config.rerank_model)?;
        debug!(
            gemini_model = generator.model(),
            rerank_model = reranker.model(),
            base_url = %config.arxiv_base_url,
            "arXiv client configured"
        );
        Ok(Self::with_providers(
            http,
            config.arxiv_base_url,
            generator,
            reranker,
        ))
    }
}

impl<G: TextGenerator, R: Reranker> ArxivClient<G, R> {
    pub fn with_providers(http: Client, base_url: impl Into<String>, generator: G, reranker: R) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            generator,
            reranker,
        }
    }

    /// Full pipeline. Reranking always scores against the original `query`,
    /// not the rewritten expression.
    pub async fn query(
        &self,
        query: &str,
        options: &QueryOptions,
    ) -> Result<Option<Vec<RankedResult>>, QueryError> {
        let search_query = if options.rewrite {
            rewrite_query(&self.generator, query).await?.search_query
        } else {
            query.to_string()
        };

        let Some(candidates) = self
            .search(&search_query, options.start, options.max_results)
            .await?
        else {
            return Ok(None);
        };

        let ranked = rerank(&self.reranker, query, &candidates, options.top_n).await?;
        Ok(Some(ranked))
    }

    /// Fetch and parse one page for an arXiv search expression, without
    /// rewriting or reranking.
    pub async fn search(
        &self,
        search_query: &str,
        start: usize,
        max_results: usize,
    ) -> Result<Option<Vec<QueryResult>>, QueryError> {
        let url = arxiv::build_query_url(&self.base_url, search_query, start, max_results)?;
        self.fetch(&url).await
    }

    /// Look up records by arXiv id (`id_list` query).
    pub async fn fetch_by_ids<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Option<Vec<QueryResult>>, QueryError> {
        let url = arxiv::build_id_list_url(&self.base_url, ids, 0, ids.len())?;
        self.fetch(&url).await
    }

    async fn fetch(&self, url: &str) -> Result<Option<Vec<QueryResult>>, QueryError> {
        match arxiv::fetch_feed(&self.http, url).await {
            Ok(results) => Ok(Some(results)),
            Err(e) if e.is_transport() => {
                warn!(error = %e, url, "arXiv request failed");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
