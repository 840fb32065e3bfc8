//! Relevance reranking of parsed feed entries.

use tracing::{debug, warn};

use crate::arxiv::types::{QueryResult, RankedResult};
use crate::cohere::{CohereError, RerankDocument, Reranker};

#[derive(Debug, thiserror::Error)]
pub enum RerankError {
    #[error("reranking failed: {0}")]
    Provider(#[from] CohereError),

    #[error("reranker returned index {index} for {len} candidates")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Score `candidates` against `query`, best first, at most `top_n` results.
///
/// Only the summaries are sent to the provider. An empty candidate list
/// returns immediately without a provider call. Hits with a NaN or
/// infinite score are dropped.
pub async fn rerank(
    reranker: &impl Reranker,
    query: &str,
    candidates: &[QueryResult],
    top_n: usize,
) -> Result<Vec<RankedResult>, RerankError> {
    if candidates.is_empty() || top_n == 0 {
        return Ok(Vec::new());
    }

    let documents: Vec<RerankDocument<'_>> = candidates
        .iter()
        .map(|c| RerankDocument {
            summary: &c.summary,
        })
        .collect();
    let top_n = top_n.min(candidates.len());

    let hits = reranker.rerank(query, &documents, top_n).await?;

    let mut ranked = hits
        .into_iter()
        .filter(|hit| {
            let finite = hit.relevance_score.is_finite();
            if !finite {
                warn!(
                    index = hit.index,
                    score = hit.relevance_score,
                    "dropping non-finite rerank score"
                );
            }
            finite
        })
        .map(|hit| {
            candidates
                .get(hit.index)
                .map(|c| RankedResult::new(c.clone(), hit.relevance_score))
                .ok_or(RerankError::IndexOutOfRange {
                    index: hit.index,
                    len: candidates.len(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    ranked.sort_by(|a, b| b.relevance_score().total_cmp(&a.relevance_score()));
    ranked.truncate(top_n);

    debug!(candidates = candidates.len(), returned = ranked.len(), "reranked");
    Ok(ranked)
}
