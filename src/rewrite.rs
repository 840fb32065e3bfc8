//! Natural-language → arXiv search expression rewriting via a text generator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::gemini::{GeminiError, TextGenerator};

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("search query response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("search query response is missing field '{0}'")]
    MissingField(&'static str),

    #[error("search query generation failed: {0}")]
    Provider(#[from] GeminiError),
}

/// Structured answer of the rewriting model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQueryGeneration {
    pub search_query: String,
    pub explanation: String,
}

/// Response schema sent with the generation request.
pub fn search_query_schema() -> Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "search_query": {"type": "STRING"},
            "explanation": {"type": "STRING"}
        },
        "required": ["search_query", "explanation"]
    })
}

pub fn build_prompt(query: &str) -> String {
    format!(
        r#"You are generating an optimized search query for the arXiv API from a user's input query. The result must follow the API's query syntax and focus on the most relevant keywords.

Field prefixes:
    ti: Title
    au: Author
    abs: Abstract
    co: Comment
    jr: Journal Reference
    cat: Subject Category
    rn: Report Number
    all: All of the above

Boolean operators:
    AND
    OR
    ANDNOT

Grouping and encoding:
    Parentheses: write %28 for ( and %29 for )
    Double quotes: write %22 for both the opening and the closing quote
    Space: write + for a space
    Any other special character must be URL-encoded

Building the query:
    Identify the key concepts, authors and exact phrases in the input query.
    Use specific field prefixes where they narrow the search.
    Join related alternatives with OR to broaden the search where useful.
    Join required concepts with AND.
    Use ANDNOT to exclude clearly irrelevant results when needed.
    Group terms and phrases with encoded parentheses or quotes.

Input query:
<input_query>
{query}
</input_query>

Respond with a JSON object with two string fields:
    "search_query": the generated, URL-encoded arXiv search query
    "explanation": a brief explanation of how the query was constructed"#
    )
}

/// Parse the model's JSON answer. Extra fields are ignored.
pub fn parse_search_query_response(text: &str) -> Result<SearchQueryGeneration, RewriteError> {
    let value: Value = serde_json::from_str(text)?;
    let field = |name: &'static str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(RewriteError::MissingField(name))
    };

    Ok(SearchQueryGeneration {
        search_query: field("search_query")?,
        explanation: field("explanation")?,
    })
}

/// One generation call: rewrite `query` into an arXiv search expression.
pub async fn rewrite_query(
    generator: &impl TextGenerator,
    query: &str,
) -> Result<SearchQueryGeneration, RewriteError> {
    let text = generator
        .generate_json(&build_prompt(query), &search_query_schema())
        .await?;
    let generation = parse_search_query_response(&text)?;
    debug!(
        search_query = %generation.search_query,
        explanation = %generation.explanation,
        "query rewritten"
    );
    Ok(generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeGenerator {
        response: Result<String, u16>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn answering(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(code: u16) -> Self {
            Self {
                response: Err(code),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<String, GeminiError> {
            assert_eq!(schema["required"][0], "search_query");
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response.clone().map_err(|code| GeminiError::Api {
                code,
                message: "boom".into(),
            })
        }
    }

    #[test]
    fn prompt_embeds_query_between_tags() {
        let prompt = build_prompt("graph neural networks for molecules");
        assert!(prompt.contains("<input_query>\ngraph neural networks for molecules\n</input_query>"));
        assert!(prompt.contains("ANDNOT"));
        assert!(prompt.contains("%28"));
    }

    #[test]
    fn parses_valid_response() {
        let parsed = parse_search_query_response(
            r#"{"search_query": "abs:%22retrieval+augmented%22", "explanation": "phrase", "extra": 1}"#,
        )
        .unwrap();
        assert_eq!(parsed.search_query, "abs:%22retrieval+augmented%22");
        assert_eq!(parsed.explanation, "phrase");
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_search_query_response("<search_query>ti:x</search_query>").unwrap_err();
        assert!(matches!(err, RewriteError::Parse(_)));
    }

    #[test]
    fn missing_field_is_schema_error() {
        let err = parse_search_query_response(r#"{"search_query": "ti:x"}"#).unwrap_err();
        assert!(matches!(err, RewriteError::MissingField("explanation")));

        let err = parse_search_query_response(r#"{"explanation": "none"}"#).unwrap_err();
        assert!(matches!(err, RewriteError::MissingField("search_query")));
    }

    #[test]
    fn non_string_field_is_schema_error() {
        let err =
            parse_search_query_response(r#"{"search_query": 3, "explanation": "x"}"#).unwrap_err();
        assert!(matches!(err, RewriteError::MissingField("search_query")));

        let err = parse_search_query_response("[]").unwrap_err();
        assert!(matches!(err, RewriteError::MissingField(_)));
    }

    #[tokio::test]
    async fn rewrite_query_sends_prompt_and_extracts_expression() {
        let generator = FakeGenerator::answering(
            r#"{"search_query": "all:rag+AND+cat:cs.CL", "explanation": "scoped"}"#,
        );

        let generation = rewrite_query(&generator, "Retrieval Augmented Generation")
            .await
            .unwrap();

        assert_eq!(generation.search_query, "all:rag+AND+cat:cs.CL");
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Retrieval Augmented Generation"));
    }

    #[tokio::test]
    async fn rewrite_query_passes_empty_query_through() {
        let generator = FakeGenerator::answering(r#"{"search_query": "all:*", "explanation": ""}"#);
        rewrite_query(&generator, "").await.unwrap();
        assert!(generator.prompts.lock().unwrap()[0].contains("<input_query>\n\n</input_query>"));
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let generator = FakeGenerator::failing(500);
        let err = rewrite_query(&generator, "q").await.unwrap_err();
        assert!(matches!(
            err,
            RewriteError::Provider(GeminiError::Api { code: 500, .. })
        ));
    }
}
