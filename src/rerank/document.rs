//! Input documents and shape normalization.
//!
//! Upstream nodes hand over documents in whatever shape their vector store
//! or loader produced. Every raw item is mapped onto a single [`Document`]
//! by trying a fixed list of [`DocumentFormat`]s in precedence order.
//!
//! ```ascii
//!  raw item ──► NestedVectorStore ──► Standard ──► PlainText ──► RawString ──► Unknown
//!               {document:{pageContent}}  {pageContent} {text}    "..."        serialize
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RerankError, Result};

/// Opaque metadata carried through reranking.
pub type Metadata = Map<String, Value>;

/// Metadata key holding the vector-store similarity of a nested document.
pub const SIMILARITY_SCORE_KEY: &str = "similarityScore";

/// A unit of content to be ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text sent to the provider and returned to the caller unchanged.
    pub content: String,
    /// Passed through untouched.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Create a document without metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// True when there is nothing to rank.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Similarity score recorded by the vector store, if any.
    pub fn similarity_score(&self) -> Option<f64> {
        self.metadata.get(SIMILARITY_SCORE_KEY).and_then(Value::as_f64)
    }

    /// Build a document from an entry of a named documents array.
    ///
    /// Strings are used as is. Objects must carry `text_field`; their other
    /// fields become metadata.
    pub fn from_field(entry: &Value, text_field: &str, index: usize) -> Result<Self> {
        match entry {
            Value::String(s) => Ok(Self::new(s.clone())),
            Value::Object(obj) => {
                let text = present(obj.get(text_field)).ok_or_else(|| {
                    RerankError::InvalidInput(format!(
                        "Document at index {} does not have field \"{}\"",
                        index, text_field
                    ))
                })?;
                let mut metadata = obj.clone();
                metadata.remove(text_field);
                Ok(Self::new(value_to_text(text)).with_metadata(metadata))
            }
            _ => Err(RerankError::InvalidInput(format!(
                "Document at index {} does not have field \"{}\"",
                index, text_field
            ))),
        }
    }
}

/// Recognized shapes of a raw input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `{document: {pageContent, metadata}, score}` as returned by vector stores.
    NestedVectorStore,
    /// `{pageContent, metadata}`.
    Standard,
    /// `{text, metadata}`.
    PlainText,
    /// A bare JSON string.
    RawString,
    /// Anything else; the whole item is serialized.
    Unknown,
}

impl DocumentFormat {
    /// Formats in the order they are tried.
    pub const PRECEDENCE: [DocumentFormat; 5] = [
        DocumentFormat::NestedVectorStore,
        DocumentFormat::Standard,
        DocumentFormat::PlainText,
        DocumentFormat::RawString,
        DocumentFormat::Unknown,
    ];

    /// First format in [`Self::PRECEDENCE`] that matches `item`.
    pub fn detect(item: &Value) -> Self {
        Self::PRECEDENCE
            .into_iter()
            .find(|format| format.matches(item))
            .unwrap_or(DocumentFormat::Unknown)
    }

    /// Whether `item` has the shape of this format.
    pub fn matches(self, item: &Value) -> bool {
        match self {
            Self::NestedVectorStore => {
                present(item.get("document").and_then(|d| d.get("pageContent"))).is_some()
            }
            Self::Standard => present(item.get("pageContent")).is_some(),
            Self::PlainText => present(item.get("text")).is_some(),
            Self::RawString => item.is_string(),
            Self::Unknown => true,
        }
    }

    /// Extract a document assuming `item` has this format.
    ///
    /// Total: a non-matching item degrades to empty content rather than
    /// failing.
    pub fn extract(self, item: &Value) -> Document {
        match self {
            Self::NestedVectorStore => {
                let inner = item.get("document");
                let content = present(inner.and_then(|d| d.get("pageContent")))
                    .map(unwrap_page_content)
                    .unwrap_or_default();

                let mut metadata = as_metadata(inner.and_then(|d| d.get("metadata")))
                    .or_else(|| as_metadata(item.get("metadata")))
                    .unwrap_or_default();
                let score = item.get("score").and_then(Value::as_f64).unwrap_or(0.0);
                metadata.insert(SIMILARITY_SCORE_KEY.to_string(), Value::from(score));

                Document::new(content).with_metadata(metadata)
            }
            Self::Standard => field_document(item, "pageContent"),
            Self::PlainText => field_document(item, "text"),
            Self::RawString => Document::new(item.as_str().unwrap_or_default()),
            Self::Unknown => Document::new(value_to_text(item))
                .with_metadata(as_metadata(item.get("metadata")).unwrap_or_default()),
        }
    }
}

/// Normalize one raw item. Pure and total.
pub fn normalize(item: &Value) -> Document {
    DocumentFormat::detect(item).extract(item)
}

/// Normalize a batch, dropping items whose content is empty.
pub fn normalize_all(items: &[Value]) -> Vec<Document> {
    items
        .iter()
        .map(normalize)
        .filter(|doc| !doc.is_empty())
        .collect()
}

fn field_document(item: &Value, field: &str) -> Document {
    let content = present(item.get(field))
        .map(value_to_text)
        .unwrap_or_default();
    Document::new(content).with_metadata(as_metadata(item.get("metadata")).unwrap_or_default())
}

/// A vector store may keep structured records in `pageContent`.
fn unwrap_page_content(page: &Value) -> String {
    if !page.is_object() {
        return value_to_text(page);
    }

    present(page.get("main_text"))
        .or_else(|| present(page.get("embedding_text")))
        .or_else(|| present(page.get("content").and_then(|c| c.get("main_text"))))
        .map(value_to_text)
        .unwrap_or_else(|| page.to_string())
}

/// Null and empty strings count as absent.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_metadata(value: Option<&Value>) -> Option<Metadata> {
    value.and_then(Value::as_object).cloned()
}
