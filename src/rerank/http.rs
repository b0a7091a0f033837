//! HTTP rerank provider.
//!
//! Speaks the `/v1/rerank` dialect shared by OpenAI-compatible gateways,
//! SiliconFlow, Jina and Cohere v1.
//!
//! ```text
//! POST {base_url}/v1/rerank
//! Authorization: Bearer {api_key}
//! {"model": "...", "query": "...", "documents": ["..."], "top_n": 3}
//!
//! 200 {"results": [{"index": 1, "relevance_score": 0.9}, ...]}
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use super::config::RerankConfig;
use super::traits::{RankEntry, RankResponse, RerankProvider};
use crate::error::{RerankError, Result};

/// HTTP-based rerank provider.
///
/// # Architecture
///
/// ```ascii
/// ┌────────────────────┐    HTTP     ┌─────────────────┐
/// │ HttpRerankProvider │ ─────────►  │  Provider API   │
/// └─────────┬──────────┘             └────────┬────────┘
///           │                                 │
///           │   RerankConfig                  │  JSON Response
///           │   - model                       │  - results[]
///           │   - base_url                    │    - index
///           │   - api_key                     │    - relevance_score
///           └─────────────────────────────────┘
/// ```
#[derive(Debug, Clone)]
pub struct HttpRerankProvider {
    client: Client,
    config: RerankConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

impl HttpRerankProvider {
    /// Create a provider from config. Fails when no API key is set.
    pub fn new(config: RerankConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RerankError::ConfigError("RERANK_API_KEY is required".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RerankError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Create a provider from `RERANK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(RerankConfig::from_env()?)
    }

    /// The configuration this provider was built with.
    pub fn config(&self) -> &RerankConfig {
        &self.config
    }

    fn status_error(status: StatusCode, body: String) -> RerankError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RerankError::AuthError(format!("{}: {}", status.as_u16(), body))
            }
            StatusCode::TOO_MANY_REQUESTS => RerankError::RateLimited(body),
            _ => RerankError::ApiError {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Interpret a parsed response body.
    pub fn parse_response(body: &serde_json::Value) -> RankResponse {
        match body.get("results") {
            Some(serde_json::Value::Array(results)) => {
                RankResponse::Ranked(results.iter().map(RankEntry::from_json).collect())
            }
            Some(_) => RankResponse::FormatMismatch {
                reason: "`results` is not an array".to_string(),
            },
            None => RankResponse::FormatMismatch {
                reason: "response has no `results` field".to_string(),
            },
        }
    }
}

#[async_trait]
impl RerankProvider for HttpRerankProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn rank(&self, query: &str, documents: &[String], top_n: usize) -> Result<RankResponse> {
        let request = RerankRequest {
            model: &self.config.model,
            query,
            documents,
            top_n: top_n.min(documents.len()),
        };

        debug!(
            "Rerank request: {} documents, top_n {}, model {}",
            documents.len(),
            request.top_n,
            self.config.model
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Rerank API error ({}): {}", status.as_u16(), error_text);
            return Err(Self::status_error(status, error_text));
        }

        let text = response.text().await?;
        let body: serde_json::Value = serde_json::from_str(&text)?;

        let parsed = Self::parse_response(&body);
        if let RankResponse::Ranked(entries) = &parsed {
            debug!("Rerank response: {} results", entries.len());
        }
        Ok(parsed)
    }
}
