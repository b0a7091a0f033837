//! Host-facing entry points.
//!
//! Workflow platforms hand documents over in three ways, and each one is a
//! thin wrapper around the same [`Reconciler`]:
//!
//! | Entry point | Input | Output |
//! |-------------|-------|--------|
//! | [`RerankHost::batch`] | all upstream items + query | one result |
//! | [`RerankHost::per_item`] | items carrying a documents field | one result per item |
//! | [`RerankHost::tool_call`] | agent JSON string | JSON string |
//!
//! Input errors become `{error, rankedDocuments: [], totalResults: 0}` when
//! `continue_on_fail` is set and are returned as `Err` otherwise. The tool
//! entry point always answers with a JSON string.

use serde_json::Value;
use tracing::{debug, error};

use crate::error::{RerankError, Result};
use crate::rerank::{Document, FieldSelection, Reconciler, RerankOutput, RerankProvider};

/// Name under which the reranker is registered as an agent tool.
pub const TOOL_NAME: &str = "rerank_documents";

/// Description shown to the agent.
pub const TOOL_DESCRIPTION: &str = "Rerank and filter documents by relevance to a query. \
Input format: {\"query\": \"user question\", \"documents\": [{\"pageContent\": \"text\", \"metadata\": {...}}, ...]}. \
Returns: {\"rankedDocuments\": [...], \"totalResults\": number}. \
Use this tool AFTER getting documents from a vector store to improve relevance.";

/// Adapter between a host platform and a [`Reconciler`].
pub struct RerankHost<P> {
    reconciler: Reconciler<P>,
    continue_on_fail: bool,
}

impl<P: RerankProvider> RerankHost<P> {
    /// Wrap a reconciler. Input errors are returned as `Err` by default.
    pub fn new(reconciler: Reconciler<P>) -> Self {
        Self {
            reconciler,
            continue_on_fail: false,
        }
    }

    /// Report input errors inside the result instead of failing.
    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    /// The wrapped reconciler.
    pub fn reconciler(&self) -> &Reconciler<P> {
        &self.reconciler
    }

    /// Rerank every upstream item as one document batch.
    ///
    /// `query` usually comes from the chat trigger that started the run.
    pub async fn batch(&self, query: Option<&str>, items: &[Value]) -> Result<RerankOutput> {
        let query = query.unwrap_or_default();
        let result = self.batch_inner(query, items).await;
        self.settle(query, result)
    }

    async fn batch_inner(&self, query: &str, items: &[Value]) -> Result<RerankOutput> {
        if items.is_empty() {
            return Err(RerankError::InvalidInput(
                "No input data received".to_string(),
            ));
        }
        self.reconciler.rerank_items(query, items).await
    }

    /// Rerank the documents array carried by each item separately.
    ///
    /// With `continue_on_fail` unset, the first failing item aborts the
    /// whole run.
    pub async fn per_item(
        &self,
        query: &str,
        items: &[Value],
        fields: &FieldSelection,
    ) -> Result<Vec<RerankOutput>> {
        let mut outputs = Vec::with_capacity(items.len());
        for (item_index, item) in items.iter().enumerate() {
            debug!("Reranking documents of item {}", item_index);
            let result = self.item_inner(query, item, fields).await;
            outputs.push(self.settle(query, result)?);
        }
        Ok(outputs)
    }

    async fn item_inner(
        &self,
        query: &str,
        item: &Value,
        fields: &FieldSelection,
    ) -> Result<RerankOutput> {
        let entries = item
            .get(&fields.documents_field)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                RerankError::InvalidInput(format!(
                    "Field \"{}\" not found or is not an array",
                    fields.documents_field
                ))
            })?;

        let documents = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| Document::from_field(entry, &fields.text_field, index))
            .collect::<Result<Vec<_>>>()?;

        let documents: Vec<Document> = documents.into_iter().filter(|d| !d.is_empty()).collect();
        if documents.is_empty() && !entries.is_empty() {
            return Err(RerankError::InvalidInput(
                "No valid document content found".to_string(),
            ));
        }

        self.reconciler.reconcile(query, &documents).await
    }

    /// Handle an agent tool invocation.
    ///
    /// Expects `{"query": "...", "documents": [...]}` and always returns a
    /// serialized [`RerankOutput`], with `error` set when the input was
    /// unusable.
    pub async fn tool_call(&self, input: &str) -> String {
        let output = match self.tool_inner(input).await {
            Ok(output) => output,
            Err((query, e)) => {
                error!("Reranker tool failed: {}", e);
                RerankOutput::failed(query, error_message(e))
            }
        };
        output.to_json().to_string()
    }

    async fn tool_inner(
        &self,
        input: &str,
    ) -> std::result::Result<RerankOutput, (String, RerankError)> {
        let parsed: Value = serde_json::from_str(input).map_err(|e| {
            (
                String::new(),
                RerankError::InvalidInput(format!("Invalid JSON format: {}", e)),
            )
        })?;

        let query = parsed
            .get("query")
            .and_then(Value::as_str)
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| {
                (
                    String::new(),
                    RerankError::InvalidInput(
                        "Missing or invalid \"query\" field (must be non-empty string)"
                            .to_string(),
                    ),
                )
            })?;

        let documents = parsed
            .get("documents")
            .and_then(Value::as_array)
            .filter(|docs| !docs.is_empty())
            .ok_or_else(|| {
                (
                    query.to_string(),
                    RerankError::InvalidInput(
                        "Missing or invalid \"documents\" field (must be non-empty array)"
                            .to_string(),
                    ),
                )
            })?;

        self.reconciler
            .rerank_items(query, documents)
            .await
            .map_err(|e| (query.to_string(), e))
    }

    fn settle(&self, query: &str, result: Result<RerankOutput>) -> Result<RerankOutput> {
        match result {
            Ok(output) => Ok(output),
            Err(e) if self.continue_on_fail => {
                error!("Reranking failed, continuing: {}", e);
                Ok(RerankOutput::failed(query, error_message(e)))
            }
            Err(e) => Err(e),
        }
    }
}

fn error_message(err: RerankError) -> String {
    match err {
        RerankError::InvalidInput(msg) => msg,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rerank::{MockRerankProvider, RankEntry, RankStatus, RerankConfig};
    use serde_json::json;

    fn host(mock: &MockRerankProvider) -> RerankHost<MockRerankProvider> {
        let config = RerankConfig::default().with_top_n(3);
        RerankHost::new(Reconciler::new(mock.clone(), &config))
    }

    #[tokio::test]
    async fn test_batch_reranks_vector_store_items() {
        let mock = MockRerankProvider::new();
        mock.push_results(vec![RankEntry::new(1, 0.9), RankEntry::new(0, 0.1)])
            .await;

        let items = vec![
            json!({"document": {"pageContent": "first"}, "score": 0.8}),
            json!({"document": {"pageContent": "second"}, "score": 0.7}),
        ];
        let output = host(&mock)
            .batch(Some("which one?"), &items)
            .await
            .unwrap();

        assert_eq!(output.ranked_documents[0].content, "second");
        assert_eq!(output.total_results, 2);
    }

    #[tokio::test]
    async fn test_batch_without_query() {
        let mock = MockRerankProvider::new();
        let items = vec![json!("A")];

        let err = host(&mock).batch(None, &items).await.unwrap_err();
        assert!(matches!(err, RerankError::InvalidInput(_)));

        let output = host(&mock)
            .continue_on_fail(true)
            .batch(None, &items)
            .await
            .unwrap();
        assert_eq!(output.error.as_deref(), Some("No user query found"));
        assert!(output.ranked_documents.is_empty());
        assert_eq!(output.total_results, 0);
    }

    #[tokio::test]
    async fn test_batch_without_items() {
        let mock = MockRerankProvider::new();
        let output = host(&mock)
            .continue_on_fail(true)
            .batch(Some("q"), &[])
            .await
            .unwrap();
        assert_eq!(output.error.as_deref(), Some("No input data received"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_per_item_uses_named_fields() {
        let mock = MockRerankProvider::new();
        mock.push_results(vec![RankEntry::new(1, 0.8)]).await;

        let items = vec![json!({
            "docs": [{"body": "alpha", "id": 1}, {"body": "beta", "id": 2}]
        })];
        let fields = FieldSelection::new("docs", "body");
        let outputs = host(&mock).per_item("q", &items, &fields).await.unwrap();

        assert_eq!(outputs.len(), 1);
        let doc = &outputs[0].ranked_documents[0];
        assert_eq!(doc.content, "beta");
        assert_eq!(doc.metadata["id"], 2);
        assert_eq!(doc.status, RankStatus::Success);
    }

    #[tokio::test]
    async fn test_per_item_empty_documents() {
        let mock = MockRerankProvider::new();
        let items = vec![json!({"documents": []})];
        let outputs = host(&mock)
            .per_item("q", &items, &FieldSelection::default())
            .await
            .unwrap();

        assert_eq!(outputs[0].total_results, 0);
        assert!(outputs[0].error.is_none());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_per_item_missing_field() {
        let mock = MockRerankProvider::new();
        mock.push_results(vec![RankEntry::new(0, 0.5)]).await;
        let items = vec![
            json!({"other": []}),
            json!({"documents": [{"text": "ok"}]}),
        ];

        let err = host(&mock)
            .per_item("q", &items, &FieldSelection::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("\"documents\" not found"));

        let outputs = host(&mock)
            .continue_on_fail(true)
            .per_item("q", &items, &FieldSelection::default())
            .await
            .unwrap();
        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].error.is_some());
        assert_eq!(outputs[0].query, "q");
        assert_eq!(outputs[1].ranked_documents[0].content, "ok");
    }

    #[tokio::test]
    async fn test_per_item_document_without_text_field() {
        let mock = MockRerankProvider::new();
        let items = vec![json!({"documents": ["fine", {"title": "no text"}]})];

        let outputs = host(&mock)
            .continue_on_fail(true)
            .per_item("q", &items, &FieldSelection::default())
            .await
            .unwrap();

        assert_eq!(
            outputs[0].error.as_deref(),
            Some("Document at index 1 does not have field \"text\"")
        );
    }

    #[tokio::test]
    async fn test_tool_call_success() {
        let mock = MockRerankProvider::new();
        mock.push_results(vec![RankEntry::new(0, 0.6)]).await;

        let input = json!({
            "query": "rust ownership",
            "documents": [{"pageContent": "Borrowing rules", "metadata": {"page": 4}}]
        })
        .to_string();
        let output: Value = serde_json::from_str(&host(&mock).tool_call(&input).await).unwrap();

        assert_eq!(output["totalResults"], 1);
        assert_eq!(output["query"], "rust ownership");
        assert_eq!(output["rankedDocuments"][0]["metadata"]["page"], 4);
    }

    #[tokio::test]
    async fn test_tool_call_invalid_inputs() {
        let mock = MockRerankProvider::new();
        let host = host(&mock);

        let output: Value = serde_json::from_str(&host.tool_call("not json").await).unwrap();
        assert!(output["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON format"));
        assert_eq!(output["totalResults"], 0);

        let output: Value =
            serde_json::from_str(&host.tool_call(r#"{"documents": ["a"]}"#).await).unwrap();
        assert!(output["error"].as_str().unwrap().contains("\"query\""));

        let output: Value =
            serde_json::from_str(&host.tool_call(r#"{"query": "q", "documents": "a"}"#).await)
                .unwrap();
        assert!(output["error"].as_str().unwrap().contains("\"documents\""));
        assert_eq!(output["query"], "q");

        let output: Value =
            serde_json::from_str(&host.tool_call(r#"{"query": "q", "documents": []}"#).await)
                .unwrap();
        assert!(output["error"]
            .as_str()
            .unwrap()
            .contains("must be non-empty array"));
        assert_eq!(output["query"], "q");
        assert!(output["rankedDocuments"].as_array().unwrap().is_empty());

        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tool_call_provider_failure_is_warning() {
        let mock = MockRerankProvider::new();
        mock.push_error(RerankError::ApiError {
            status: 500,
            body: "boom".to_string(),
        })
        .await;

        let input = r#"{"query": "q", "documents": ["a", "b"]}"#;
        let output: Value = serde_json::from_str(&host(&mock).tool_call(input).await).unwrap();

        assert!(output.get("error").is_none());
        assert!(output["warning"].as_str().unwrap().contains("500"));
        assert_eq!(
            output["rankedDocuments"][0]["status"],
            "api_failed_fallback"
        );
    }
}
