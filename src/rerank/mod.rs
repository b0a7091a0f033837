//! Reranking with deterministic degraded mode.
//!
//! Reorders retrieval candidates by a remote relevance model and keeps the
//! top N. When the model is unreachable or answers nonsense, the caller
//! still gets a ranking: the retrieval order (or vector-store similarity),
//! tagged as a fallback.
//!
//! # Architecture
//!
//! ```ascii
//!                    ┌─────────────────────────────┐
//!                    │   Raw items + Query         │
//!                    └──────────────┬──────────────┘
//!                                   │ normalize()
//!                                   ▼
//!                    ┌─────────────────────────────┐
//!                    │  Vec<Document>              │
//!                    └──────────────┬──────────────┘
//!                                   │
//!                                   ▼
//!     ┌─────────────────────────────────────────────────────┐
//!     │                    Reconciler                        │
//!     │   reconcile(query, docs) → RerankOutput              │
//!     └──────────────────────────┬──────────────────────────┘
//!                                │ rank(query, texts, top_n)
//!                                ▼
//!                    ┌─────────────────────────────┐
//!                    │   RerankProvider trait      │
//!                    │   (HTTP, retrying, mock)    │
//!                    └─────────────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! ```ascii
//! rerank/
//! ├── mod.rs        ─► This file (re-exports)
//! ├── config.rs     ─► RerankConfig, FallbackOrdering, FieldSelection
//! ├── document.rs   ─► Document, DocumentFormat, normalize()
//! ├── traits.rs     ─► RerankProvider, RankEntry, RankResponse
//! ├── http.rs       ─► HttpRerankProvider
//! ├── mock.rs       ─► MockRerankProvider
//! ├── result.rs     ─► RankedDocument, RankStatus, RerankOutput
//! └── reconciler.rs ─► Reconciler, synthetic_ranking()
//! ```
//!
//! # Example
//!
//! ```ignore
//! use edgequake_rerank::rerank::{Reconciler, RerankConfig};
//!
//! let reconciler = Reconciler::from_config(RerankConfig::from_env()?)?;
//! let output = reconciler.rerank_items("What is machine learning?", &items).await?;
//! ```

mod config;
mod document;
mod http;
mod mock;
mod reconciler;
mod result;
mod traits;

pub use config::{
    FallbackOrdering, FieldSelection, RerankConfig, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_N,
};
pub use document::{
    normalize, normalize_all, Document, DocumentFormat, Metadata, SIMILARITY_SCORE_KEY,
};
pub use http::HttpRerankProvider;
pub use mock::{MockRerankProvider, RecordedCall};
pub use reconciler::{synthetic_ranking, synthetic_score, Reconciler};
pub use result::{RankStatus, RankedDocument, RerankOutput};
pub use traits::{RankEntry, RankResponse, RerankProvider};
