//! Reranker configuration types.
//!
//! # Architecture
//!
//! ```ascii
//! ┌─────────────────────────────────────────────────────────┐
//! │                    RerankConfig                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ model: String         ─────► Provider model identifier  │
//! │ base_url: String      ─────► {base_url}/v1/rerank       │
//! │ api_key: Option       ─────► Bearer credential          │
//! │ top_n: usize          ─────► Max results to return      │
//! │ timeout: Duration     ─────► Request timeout            │
//! │ fallback              ─────► Degraded-mode ordering     │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use crate::error::{RerankError, Result};

/// Default provider model.
pub const DEFAULT_MODEL: &str = "rerank-1";

/// Default provider base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default number of documents kept after reranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How documents are ordered when the provider cannot be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackOrdering {
    /// Keep retrieval order, scores `1.0, 0.9, 0.8, ...`.
    #[default]
    InputOrder,
    /// Prefer the `similarityScore` metadata carried over from the vector
    /// store; documents without one use their input-order score.
    SimilarityScore,
}

impl FallbackOrdering {
    /// Parse from a string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "input" | "input-order" | "input_order" | "original" => Some(Self::InputOrder),
            "similarity" | "similarity-score" | "similarity_score" | "score" => {
                Some(Self::SimilarityScore)
            }
            _ => None,
        }
    }
}

/// Configuration for a reranker.
///
/// # Example
///
/// ```ignore
/// let config = RerankConfig::new("sk-...")
///     .with_base_url("https://api.siliconflow.cn")
///     .with_model("BAAI/bge-reranker-v2-m3")
///     .with_top_n(3);
/// ```
#[derive(Debug, Clone)]
pub struct RerankConfig {
    /// Model name to use.
    pub model: String,
    /// Base URL of the provider, without trailing slash.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Maximum number of results to return (always >= 1).
    pub top_n: usize,
    /// Request timeout.
    pub timeout: Duration,
    /// Ordering used by the degraded-mode fallback.
    pub fallback: FallbackOrdering,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            top_n: DEFAULT_TOP_N,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fallback: FallbackOrdering::default(),
        }
    }
}

impl RerankConfig {
    /// Create a config with the given API key and defaults elsewhere.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `RERANK_API_KEY`: API key (optional here, required by the HTTP provider)
    /// - `RERANK_BASE_URL`: Provider base URL
    /// - `RERANK_MODEL`: Model identifier
    /// - `RERANK_TOP_N`: Positive integer
    /// - `RERANK_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("RERANK_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("RERANK_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Ok(model) = std::env::var("RERANK_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = std::env::var("RERANK_TOP_N") {
            let top_n = raw.trim().parse::<usize>().map_err(|_| {
                RerankError::ConfigError(format!(
                    "RERANK_TOP_N must be a positive integer, got '{}'",
                    raw
                ))
            })?;
            config = config.with_top_n(top_n);
        }
        if let Ok(raw) = std::env::var("RERANK_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                RerankError::ConfigError(format!(
                    "RERANK_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL. A trailing slash is removed.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the top N results to return. Zero is raised to one.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the fallback ordering.
    pub fn with_fallback(mut self, fallback: FallbackOrdering) -> Self {
        self.fallback = fallback;
        self
    }

    /// Full rerank endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/rerank", self.base_url)
    }
}

/// Field names used when documents live inside a structured input item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    /// Field holding the documents array.
    pub documents_field: String,
    /// Field holding the text inside each document object.
    pub text_field: String,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            documents_field: "documents".to_string(),
            text_field: "text".to_string(),
        }
    }
}

impl FieldSelection {
    /// Create a selection with explicit field names.
    pub fn new(documents_field: impl Into<String>, text_field: impl Into<String>) -> Self {
        Self {
            documents_field: documents_field.into(),
            text_field: text_field.into(),
        }
    }
}
