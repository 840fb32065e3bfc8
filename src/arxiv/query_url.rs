use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use super::ArxivError;

/// Characters escaped inside a search expression.
/// `+` and `%` pass through: expressions arrive already URL-encoded
/// (`+` for space, `%28`/`%29`/`%22` for grouping).
const EXPRESSION_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_expression(expression: &str) -> String {
    expression
        .split(' ')
        .map(|part| utf8_percent_encode(part, EXPRESSION_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Build `{base}/query?search_query=…&start=…&max_results=…`.
pub fn build_query_url(
    base_url: &str,
    search_query: &str,
    start: usize,
    max_results: usize,
) -> Result<String, ArxivError> {
    if search_query.is_empty() {
        return Err(ArxivError::EmptySearchQuery);
    }

    Ok(format!(
        "{}/query?search_query={}&start={start}&max_results={max_results}",
        base_url.trim_end_matches('/'),
        encode_expression(search_query)
    ))
}

/// Build `{base}/query?id_list=…&start=…&max_results=…` for direct id lookup.
pub fn build_id_list_url<S: AsRef<str>>(
    base_url: &str,
    ids: &[S],
    start: usize,
    max_results: usize,
) -> Result<String, ArxivError> {
    let ids: Vec<String> = ids
        .iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty())
        .map(encode_expression)
        .collect();
    if ids.is_empty() {
        return Err(ArxivError::EmptyIdList);
    }

    Ok(format!(
        "{}/query?id_list={}&start={start}&max_results={max_results}",
        base_url.trim_end_matches('/'),
        ids.join(",")
    ))
}
