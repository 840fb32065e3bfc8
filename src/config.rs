use std::env;
use std::time::Duration;

use crate::{arxiv, cohere, gemini};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey")]
    GeminiKeyNotSet,

    #[error("COHERE_API_KEY not set. Get one at https://dashboard.cohere.com/api-keys")]
    CohereKeyNotSet,

    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Provider credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Everything [`crate::ArxivClient`] needs at construction.
///
/// Environment variables read by [`Config::from_env`]:
/// - `GEMINI_API_KEY` (required), `GEMINI_MODEL`
/// - `COHERE_API_KEY` (required), `COHERE_RERANK_MODEL`
/// - `ARXIV_API_URL`, `HTTP_TIMEOUT_SECS`
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: ApiKey,
    pub gemini_model: String,
    pub cohere_api_key: ApiKey,
    pub rerank_model: String,
    pub arxiv_base_url: String,
    pub http_timeout: Duration,
}

impl Config {
    /// Config with the given credentials and default models/endpoints.
    pub fn new(gemini_api_key: impl Into<String>, cohere_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: ApiKey::new(gemini_api_key),
            gemini_model: gemini::DEFAULT_MODEL.to_string(),
            cohere_api_key: ApiKey::new(cohere_api_key),
            rerank_model: cohere::DEFAULT_MODEL.to_string(),
            arxiv_base_url: arxiv::API_BASE.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini_key = var("GEMINI_API_KEY").ok_or(ConfigError::GeminiKeyNotSet)?;
        let cohere_key = var("COHERE_API_KEY").ok_or(ConfigError::CohereKeyNotSet)?;
        let mut config = Self::new(gemini_key, cohere_key);

        if let Some(model) = var("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(model) = var("COHERE_RERANK_MODEL") {
            config.rerank_model = model;
        }
        if let Some(base) = var("ARXIV_API_URL") {
            match url::Url::parse(&base) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                    config.arxiv_base_url = base.trim_end_matches('/').to_string();
                }
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "ARXIV_API_URL",
                        value: base,
                    });
                }
            }
        }
        if let Some(secs) = var("HTTP_TIMEOUT_SECS") {
            let parsed = secs
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "HTTP_TIMEOUT_SECS",
                    value: secs.clone(),
                })?;
            config.http_timeout = Duration::from_secs(parsed);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn requires_gemini_key() {
        let err = Config::from_lookup(lookup(&[("COHERE_API_KEY", "c")])).unwrap_err();
        assert!(matches!(err, ConfigError::GeminiKeyNotSet));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn requires_cohere_key() {
        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "g")])).unwrap_err();
        assert!(matches!(err, ConfigError::CohereKeyNotSet));
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "   "),
            ("COHERE_API_KEY", "c"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::GeminiKeyNotSet));
    }

    #[test]
    fn defaults_apply_when_only_keys_set() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", " g-key "),
            ("COHERE_API_KEY", "c-key"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_api_key.expose(), "g-key");
        assert_eq!(config.cohere_api_key.expose(), "c-key");
        assert_eq!(config.gemini_model, gemini::DEFAULT_MODEL);
        assert_eq!(config.rerank_model, cohere::DEFAULT_MODEL);
        assert_eq!(config.arxiv_base_url, arxiv::API_BASE);
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("COHERE_API_KEY", "c"),
            ("GEMINI_MODEL", "gemini-test"),
            ("COHERE_RERANK_MODEL", "rerank-test"),
            ("ARXIV_API_URL", "https://arxiv.example/api/"),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_model, "gemini-test");
        assert_eq!(config.rerank_model, "rerank-test");
        assert_eq!(config.arxiv_base_url, "https://arxiv.example/api");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_timeout_and_url() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("COHERE_API_KEY", "c"),
            ("HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "HTTP_TIMEOUT_SECS", .. }));

        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("COHERE_API_KEY", "c"),
            ("ARXIV_API_URL", "ftp://arxiv.example"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ARXIV_API_URL", .. }));
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let config = Config::new("secret-gemini", "secret-cohere");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
