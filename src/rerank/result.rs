//! Reranking result types.
//!
//! These are the terminal values handed back to the host. They serialize
//! with camelCase keys:
//!
//! ```json
//! {
//!   "rankedDocuments": [
//!     {"content": "B", "metadata": {}, "relevanceScore": 0.9, "originalIndex": 1, "status": "success"}
//!   ],
//!   "totalResults": 1,
//!   "query": "What is machine learning?"
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::document::{Document, Metadata};

/// How a ranked document obtained its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStatus {
    /// Scored by the provider.
    Success,
    /// Provider answered without a usable `results` array.
    FormatErrorFallback,
    /// Provider call failed.
    ApiFailedFallback,
}

impl RankStatus {
    /// True for both degraded statuses.
    pub fn is_fallback(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// A document with its rerank score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDocument {
    pub content: String,
    pub metadata: Metadata,
    pub relevance_score: f64,
    /// Position of the document in the reconciled input.
    pub original_index: usize,
    pub status: RankStatus,
}

impl RankedDocument {
    pub(crate) fn from_document(
        document: &Document,
        relevance_score: f64,
        original_index: usize,
        status: RankStatus,
    ) -> Self {
        Self {
            content: document.content.clone(),
            metadata: document.metadata.clone(),
            relevance_score,
            original_index,
            status,
        }
    }
}

/// Result object returned to the host for one reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankOutput {
    pub ranked_documents: Vec<RankedDocument>,
    pub total_results: usize,
    pub query: String,
    /// Why the result is degraded, when it is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Input error reported instead of results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RerankOutput {
    /// Build an output; `total_results` follows the document count.
    pub fn new(query: impl Into<String>, ranked_documents: Vec<RankedDocument>) -> Self {
        Self {
            total_results: ranked_documents.len(),
            ranked_documents,
            query: query.into(),
            warning: None,
            error: None,
        }
    }

    /// An output with no documents.
    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }

    /// An error result: no documents, `error` set.
    pub fn failed(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(query)
        }
    }

    /// Attach a degradation warning.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// True when the documents came from the synthetic fallback.
    pub fn is_degraded(&self) -> bool {
        self.ranked_documents
            .first()
            .is_some_and(|doc| doc.status.is_fallback())
    }

    /// Serialize to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
