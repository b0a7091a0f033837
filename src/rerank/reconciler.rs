//! Result reconciliation: provider scores back onto the caller's documents.
//!
//! # Pipeline
//!
//! ```ascii
//!   documents ──► top_n = min(top_n, len) ──► provider.rank()
//!                                               │
//!            ┌──────────────────────────────────┼───────────────────────────┐
//!            ▼                                  ▼                           ▼
//!      Ranked(entries)                   FormatMismatch /              Err(e)
//!   drop invalid, sort desc,            empty results
//!   truncate, map back                         │                           │
//!            │                                  ▼                           ▼
//!            │                     synthetic(format_error_fallback) synthetic(api_failed_fallback)
//!            ▼                                  │                           │
//!       RerankOutput ◄──────────────────────────┴───────────────────────────┘
//! ```
//!
//! Exactly one provider call per reconciliation. Provider trouble never
//! surfaces as an error: it degrades to a deterministic synthetic ranking
//! with a `warning`. Only input errors are returned as `Err`.

use serde_json::Value;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

use super::config::{FallbackOrdering, RerankConfig};
use super::document::{normalize_all, Document};
use super::http::HttpRerankProvider;
use super::result::{RankStatus, RankedDocument, RerankOutput};
use super::traits::{RankEntry, RankResponse, RerankProvider};
use crate::error::{RerankError, Result};

/// Score of the document at `position` in a synthetic ranking.
pub fn synthetic_score(position: usize) -> f64 {
    1.0 - 0.1 * position as f64
}

/// Reconciles provider responses with the documents they were asked about.
pub struct Reconciler<P> {
    provider: P,
    top_n: usize,
    fallback: FallbackOrdering,
}

impl Reconciler<HttpRerankProvider> {
    /// Reconciler backed by the HTTP provider described by `config`.
    pub fn from_config(config: RerankConfig) -> Result<Self> {
        let top_n = config.top_n.max(1);
        let fallback = config.fallback;
        let provider = HttpRerankProvider::new(config)?;
        Ok(Self {
            provider,
            top_n,
            fallback,
        })
    }
}

impl<P: RerankProvider> Reconciler<P> {
    /// Create a reconciler using `config`'s `top_n` and fallback ordering.
    pub fn new(provider: P, config: &RerankConfig) -> Self {
        Self {
            provider,
            top_n: config.top_n.max(1),
            fallback: config.fallback,
        }
    }

    /// Override the configured top N. Zero is raised to one.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    /// Override the fallback ordering.
    pub fn with_fallback(mut self, fallback: FallbackOrdering) -> Self {
        self.fallback = fallback;
        self
    }

    /// The provider in use.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Configured top N.
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Normalize raw items and reconcile them.
    ///
    /// A non-empty batch whose items all normalize to empty content is an
    /// input error; an empty batch yields an empty result.
    pub async fn rerank_items(&self, query: &str, items: &[Value]) -> Result<RerankOutput> {
        let documents = normalize_all(items);
        debug!(
            "Normalized {} of {} input items",
            documents.len(),
            items.len()
        );
        if documents.is_empty() && !items.is_empty() {
            return Err(RerankError::InvalidInput(
                "No valid document content found".to_string(),
            ));
        }
        self.reconcile(query, &documents).await
    }

    /// Rank `documents` against `query`.
    ///
    /// `documents` must already be normalized; their order is the index
    /// space the provider's results refer to.
    pub async fn reconcile(&self, query: &str, documents: &[Document]) -> Result<RerankOutput> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(RerankError::InvalidInput("No user query found".to_string()));
        }

        if documents.is_empty() {
            return Ok(RerankOutput::empty(query));
        }

        let top_n = self.top_n.min(documents.len());
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();

        debug!(
            "Reranking {} documents with {} ({}), top_n {}",
            documents.len(),
            self.provider.name(),
            self.provider.model(),
            top_n
        );

        match self.provider.rank(trimmed, &texts, top_n).await {
            Ok(RankResponse::Ranked(entries)) if !entries.is_empty() => {
                let ranked = Self::rank_from_entries(&entries, documents, top_n);
                info!("Returned {} reranked documents", ranked.len());
                Ok(RerankOutput::new(query, ranked))
            }
            Ok(RankResponse::Ranked(_)) => {
                warn!("Rerank API returned an empty results array");
                Ok(self.degraded(
                    query,
                    documents,
                    top_n,
                    RankStatus::FormatErrorFallback,
                    "Rerank API returned no results.".to_string(),
                ))
            }
            Ok(RankResponse::FormatMismatch { reason }) => {
                warn!("Unexpected rerank API response format: {}", reason);
                Ok(self.degraded(
                    query,
                    documents,
                    top_n,
                    RankStatus::FormatErrorFallback,
                    "Unexpected API response format.".to_string(),
                ))
            }
            Err(e) => {
                warn!("Rerank API failed: {}", e);
                Ok(self.degraded(
                    query,
                    documents,
                    top_n,
                    RankStatus::ApiFailedFallback,
                    format!("Rerank API failed: {}.", e),
                ))
            }
        }
    }

    /// Validate, sort and truncate provider entries, then map them back.
    fn rank_from_entries(
        entries: &[RankEntry],
        documents: &[Document],
        top_n: usize,
    ) -> Vec<RankedDocument> {
        let mut scored: Vec<(usize, f64)> = entries
            .iter()
            .filter_map(|entry| entry.validated(documents.len()))
            .collect();

        let dropped = entries.len() - scored.len();
        if dropped > 0 {
            warn!("Dropped {} invalid rerank result entries", dropped);
        }

        // Stable: equal scores keep response order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_n);

        scored
            .into_iter()
            .map(|(index, score)| {
                RankedDocument::from_document(&documents[index], score, index, RankStatus::Success)
            })
            .collect()
    }

    fn degraded(
        &self,
        query: &str,
        documents: &[Document],
        top_n: usize,
        status: RankStatus,
        reason: String,
    ) -> RerankOutput {
        let ranked = synthetic_ranking(documents, top_n, self.fallback, status);
        let suffix = match self.fallback {
            FallbackOrdering::InputOrder => "Using original order.",
            FallbackOrdering::SimilarityScore => "Using similarity order.",
        };
        RerankOutput::new(query, ranked).with_warning(format!("{} {}", reason, suffix))
    }
}

/// Deterministic ranking used when the provider is unusable.
///
/// With [`FallbackOrdering::InputOrder`] the first `top_n` documents keep
/// their order and get scores `1.0, 0.9, 0.8, ...`. With
/// [`FallbackOrdering::SimilarityScore`] a non-zero `similarityScore` in the
/// metadata replaces the positional score and documents are stably sorted
/// by score before truncation.
pub fn synthetic_ranking(
    documents: &[Document],
    top_n: usize,
    ordering: FallbackOrdering,
    status: RankStatus,
) -> Vec<RankedDocument> {
    let mut scored: Vec<(usize, f64)> = documents
        .iter()
        .enumerate()
        .map(|(position, doc)| {
            let score = match ordering {
                FallbackOrdering::InputOrder => synthetic_score(position),
                FallbackOrdering::SimilarityScore => doc
                    .similarity_score()
                    .filter(|s| *s != 0.0 && s.is_finite())
                    .unwrap_or_else(|| synthetic_score(position)),
            };
            (position, score)
        })
        .collect();

    if ordering == FallbackOrdering::SimilarityScore {
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    }
    scored.truncate(top_n);

    scored
        .into_iter()
        .map(|(index, score)| RankedDocument::from_document(&documents[index], score, index, status))
        .collect()
}
