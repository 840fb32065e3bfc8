//! arXiv query API: URL assembly, feed download and Atom parsing.

pub mod feed;
pub mod query_url;
pub mod types;

pub use feed::{FeedError, parse_feed};
pub use query_url::{build_id_list_url, build_query_url};

use reqwest::Client;
use tracing::debug;

use types::QueryResult;

pub const API_BASE: &str = "http://export.arxiv.org/api";

#[derive(Debug, thiserror::Error)]
pub enum ArxivError {
    #[error("invalid argument: empty search query")]
    EmptySearchQuery,

    #[error("invalid argument: empty id list")]
    EmptyIdList,

    #[error("arXiv request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("arXiv request failed: status {0}")]
    Status(u16),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

impl ArxivError {
    /// Connection errors, timeouts and non-2xx responses.
    pub fn is_transport(&self) -> bool {
        matches!(self, ArxivError::Http(_) | ArxivError::Status(_))
    }
}

/// GET `url` and parse the Atom body.
pub async fn fetch_feed(http: &Client, url: &str) -> Result<Vec<QueryResult>, ArxivError> {
    let response = http
        .get(url)
        .header("User-Agent", crate::USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ArxivError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    let results = parse_feed(&body)?;
    debug!(url, bytes = body.len(), entries = results.len(), "arXiv feed parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_classification() {
        assert!(ArxivError::Status(503).is_transport());
        assert!(!ArxivError::EmptySearchQuery.is_transport());
        assert!(!ArxivError::Feed(FeedError::Structure("x")).is_transport());
    }
}
