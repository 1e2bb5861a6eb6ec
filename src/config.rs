//! # Documentation Configuration
//!
//! Process-level configuration for the assembled document's `info` block and
//! top-level defaults. The input is an opaque set of key/value pairs — in
//! practice environment variables — so hosts can wire it to whatever
//! configuration layer they already have.
//!
//! ## Recognized keys
//!
//! | Key | Meaning | Default |
//! |-----|---------|---------|
//! | `API_TITLE` | document title | `API` |
//! | `API_VERSION` | document version | `1.0.0` |
//! | `API_DESCRIPTION` | info description | — |
//! | `API_TERMS_OF_SERVICE` | terms-of-service text or URL | — |
//! | `API_CONTACT_EMAIL` | contact email | — |
//! | `API_HOST` | serving host | — |
//! | `API_BASE_PATH` | base path prefix | — |
//! | `API_SCHEMES` | comma-separated scheme list | `http` |
//! | `API_CONSUMES_CONTENT_TYPES` | comma-separated default request types | `application/json` |
//! | `API_PRODUCES_CONTENT_TYPES` | comma-separated default response types | `application/json` |
//! | `API_SECURITY_DEFINITIONS` | raw JSON object, passed through verbatim | — |
//!
//! Unrecognized keys are ignored; the input is shared with the rest of the
//! application's configuration.

use std::env;

use anyhow::Context;
use serde_json::Value;

const STRING_KEYS: [&str; 7] = [
    "API_TITLE",
    "API_VERSION",
    "API_DESCRIPTION",
    "API_TERMS_OF_SERVICE",
    "API_CONTACT_EMAIL",
    "API_HOST",
    "API_BASE_PATH",
];

const LIST_KEYS: [&str; 3] = [
    "API_SCHEMES",
    "API_CONSUMES_CONTENT_TYPES",
    "API_PRODUCES_CONTENT_TYPES",
];

/// Configuration consumed by the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct DocConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact_email: Option<String>,
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub schemes: Vec<String>,
    pub consumes_content_types: Vec<String>,
    pub produces_content_types: Vec<String>,
    /// Operator-provided security scheme declarations, passed through into
    /// the document's `securityDefinitions` without interpretation.
    pub security_definitions: Option<Value>,
    /// Whether a route's explicit tags override its group-derived tag.
    pub explicit_tags_win: bool,
}

impl Default for DocConfig {
    fn default() -> Self {
        DocConfig {
            title: "API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            terms_of_service: None,
            contact_email: None,
            host: None,
            base_path: None,
            schemes: vec!["http".to_string()],
            consumes_content_types: vec!["application/json".to_string()],
            produces_content_types: vec!["application/json".to_string()],
            security_definitions: None,
            explicit_tags_win: true,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl DocConfig {
    /// Build a configuration from opaque key/value pairs.
    ///
    /// # Errors
    ///
    /// Fails when `API_SECURITY_DEFINITIONS` is present but not valid JSON:
    /// security schemes are emitted verbatim, so a malformed declaration
    /// would otherwise corrupt the document silently.
    pub fn from_pairs<I, K, V>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = DocConfig::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "API_TITLE" => config.title = value.to_string(),
                "API_VERSION" => config.version = value.to_string(),
                "API_DESCRIPTION" => config.description = Some(value.to_string()),
                "API_TERMS_OF_SERVICE" => config.terms_of_service = Some(value.to_string()),
                "API_CONTACT_EMAIL" => config.contact_email = Some(value.to_string()),
                "API_HOST" => config.host = Some(value.to_string()),
                "API_BASE_PATH" => config.base_path = Some(value.to_string()),
                "API_SCHEMES" => config.schemes = split_list(value),
                "API_CONSUMES_CONTENT_TYPES" => {
                    config.consumes_content_types = split_list(value)
                }
                "API_PRODUCES_CONTENT_TYPES" => {
                    config.produces_content_types = split_list(value)
                }
                "API_SECURITY_DEFINITIONS" => {
                    let parsed: Value = serde_json::from_str(value)
                        .context("API_SECURITY_DEFINITIONS is not valid JSON")?;
                    config.security_definitions = Some(parsed);
                }
                _ => {}
            }
        }
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for key in STRING_KEYS
            .iter()
            .chain(LIST_KEYS.iter())
            .chain(["API_SECURITY_DEFINITIONS"].iter())
        {
            if let Ok(value) = env::var(key) {
                pairs.push((key.to_string(), value));
            }
        }
        Self::from_pairs(pairs)
    }
}
