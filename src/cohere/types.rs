use serde::{Deserialize, Serialize};

/// Field used for ranking. Only the summary is sent to the provider.
pub const RANK_FIELD: &str = "summary";

#[derive(Debug, Serialize)]
pub struct RerankRequest<'a> {
    pub model: &'a str,
    pub query: &'a str,
    pub documents: &'a [RerankDocument<'a>],
    pub rank_fields: [&'static str; 1],
    pub top_n: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RerankDocument<'a> {
    pub summary: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RerankResponse {
    pub results: Vec<RerankHit>,
}

/// Provider score for the document at `index` of the submitted list.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RerankHit {
    pub index: usize,
    pub relevance_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}
