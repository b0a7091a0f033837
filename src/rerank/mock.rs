//! Scripted rerank provider for testing.
//!
//! Responses are queued up front and handed out in order, one per `rank`
//! call. An empty queue answers with a format mismatch so a forgotten
//! script shows up as a degraded result instead of a panic.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::traits::{RankEntry, RankResponse, RerankProvider};
use crate::error::{RerankError, Result};

/// Recorded arguments of one `rank` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub query: String,
    pub documents: Vec<String>,
    pub top_n: usize,
}

/// Mock rerank provider with queue-based responses.
#[derive(Debug, Clone, Default)]
pub struct MockRerankProvider {
    responses: Arc<Mutex<Vec<Result<RankResponse>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockRerankProvider {
    /// Create a provider with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub async fn push_results(&self, entries: Vec<RankEntry>) {
        self.responses
            .lock()
            .await
            .push(Ok(RankResponse::Ranked(entries)));
    }

    /// Queue a response without a usable `results` array.
    pub async fn push_format_mismatch(&self, reason: impl Into<String>) {
        self.responses
            .lock()
            .await
            .push(Ok(RankResponse::FormatMismatch {
                reason: reason.into(),
            }));
    }

    /// Queue a failed call.
    pub async fn push_error(&self, error: RerankError) {
        self.responses.lock().await.push(Err(error));
    }

    /// Number of `rank` calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Arguments of every `rank` call, oldest first.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RerankProvider for MockRerankProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-reranker"
    }

    async fn rank(&self, query: &str, documents: &[String], top_n: usize) -> Result<RankResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().await.push(RecordedCall {
            query: query.to_string(),
            documents: documents.to_vec(),
            top_n,
        });

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Ok(RankResponse::FormatMismatch {
                reason: "mock script exhausted".to_string(),
            });
        }
        responses.remove(0)
    }
}
