//! Rerank provider trait definition.
//!
//! # Architecture
//!
//! ```ascii
//!                      ┌──────────────────────┐
//!                      │ RerankProvider Trait │
//!                      └──────────┬───────────┘
//!                                 │
//!        ┌────────────────────────┼────────────────────────┐
//!        │                        │                        │
//!        ▼                        ▼                        ▼
//! ┌────────────────┐   ┌────────────────────┐   ┌────────────────────┐
//! │ HttpRerank-    │   │ RetryingProvider   │   │ MockRerankProvider │
//! │ Provider       │   │ (wraps another)    │   │ (scripted)         │
//! └────────────────┘   └────────────────────┘   └────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One raw `{index, relevance_score}` entry from a provider response.
///
/// Fields are optional because the provider is not trusted: entries are
/// validated by the reconciler, which drops the ones it cannot use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Position in the request's `documents` array, if it was an integer.
    pub index: Option<i64>,
    /// Relevance score, if it was numeric.
    pub relevance_score: Option<f64>,
}

impl RankEntry {
    /// A well-formed entry.
    pub fn new(index: i64, relevance_score: f64) -> Self {
        Self {
            index: Some(index),
            relevance_score: Some(relevance_score),
        }
    }

    /// Parse an entry from arbitrary JSON, keeping only well-typed fields.
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self {
            index: value.get("index").and_then(integral),
            relevance_score: value
                .get("relevance_score")
                .and_then(serde_json::Value::as_f64),
        }
    }

    /// Index and score when both are usable for `document_count` documents.
    pub fn validated(&self, document_count: usize) -> Option<(usize, f64)> {
        let index = usize::try_from(self.index?).ok()?;
        let score = self.relevance_score?;
        (index < document_count && score.is_finite()).then_some((index, score))
    }
}

/// JSON integers, and floats with no fractional part such as `1.0`.
fn integral(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Outcome of a provider call that reached the provider and got a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub enum RankResponse {
    /// The body carried a `results` array.
    Ranked(Vec<RankEntry>),
    /// The body parsed but had no usable `results` array.
    FormatMismatch {
        /// What was wrong with the body.
        reason: String,
    },
}

/// Trait for reranking providers.
///
/// Implementations make a single attempt per call. Transport, status and
/// parse failures are returned as errors; a body without `results` is a
/// [`RankResponse::FormatMismatch`].
#[async_trait]
pub trait RerankProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Score `documents` against `query`.
    ///
    /// # Arguments
    ///
    /// - `query`: Non-empty search query
    /// - `documents`: Document texts; result indices refer to this order
    /// - `top_n`: Number of results requested, already clamped by the caller
    async fn rank(&self, query: &str, documents: &[String], top_n: usize) -> Result<RankResponse>;
}
