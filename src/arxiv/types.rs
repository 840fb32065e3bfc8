use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// One `<entry>` of an arXiv Atom feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Canonical arXiv URI, e.g. `http://arxiv.org/abs/2005.11401v4`.
    pub id: String,
    pub updated: String,
    pub published: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub link: String,
    pub pdf_link: String,
    pub primary_category: String,
    pub categories: Vec<String>,
}

/// A [`QueryResult`] with the relevance score assigned by the reranker.
///
/// Serializes flat: the score sits next to the record's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    result: QueryResult,
    relevance_score: f64,
}

impl RankedResult {
    pub(crate) fn new(result: QueryResult, relevance_score: f64) -> Self {
        Self {
            result,
            relevance_score,
        }
    }

    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }

    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    pub fn into_result(self) -> QueryResult {
        self.result
    }
}

impl Deref for RankedResult {
    type Target = QueryResult;

    fn deref(&self) -> &QueryResult {
        &self.result
    }
}
