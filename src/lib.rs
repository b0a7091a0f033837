//! EdgeQuake Rerank - Document reranking with deterministic fallback
//!
//! Given a query and candidate documents (usually the output of a vector
//! search), calls a remote reranking model, reorders the documents by
//! relevance and keeps the top N. Provider trouble never fails the request:
//! the result degrades to a synthetic ranking and carries a warning.
//!
//! This crate provides:
//! - Normalization of heterogeneous document shapes ([`rerank::normalize`])
//! - A provider abstraction with an HTTP implementation ([`RerankProvider`])
//! - The reconciliation pipeline and its fallback policy ([`Reconciler`])
//! - Optional bounded retry at the provider boundary ([`RetryingProvider`])
//! - Host entry points for batch, per-item and agent-tool use ([`RerankHost`])
//!
//! # Example
//!
//! ```ignore
//! use edgequake_rerank::{Reconciler, RerankConfig};
//!
//! let config = RerankConfig::new("sk-...").with_top_n(3);
//! let reconciler = Reconciler::from_config(config)?;
//! let output = reconciler.rerank_items("What is machine learning?", &items).await?;
//! for doc in &output.ranked_documents {
//!     println!("{:.3} {}", doc.relevance_score, doc.content);
//! }
//! ```
//!
//! # See Also
//!
//! - [`crate::rerank`] for the pipeline and provider types
//! - [`crate::host`] for platform-facing wrappers

pub mod error;
pub mod host;
pub mod rerank;
pub mod retry;

pub use error::{RerankError, Result, RetryStrategy};
pub use host::{RerankHost, TOOL_DESCRIPTION, TOOL_NAME};
pub use rerank::{
    normalize, Document, DocumentFormat, FallbackOrdering, FieldSelection, HttpRerankProvider,
    MockRerankProvider, RankEntry, RankResponse, RankStatus, RankedDocument, Reconciler,
    RerankConfig, RerankOutput, RerankProvider,
};
pub use retry::{RetryExecutor, RetryingProvider};
