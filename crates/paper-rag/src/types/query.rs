//! Request types for indexing and querying

use serde::{Deserialize, Serialize};

/// Request to index a document's text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    /// Owner of the document
    pub owner_id: String,
    /// Document identifier, unique per owner
    pub document_id: String,
    /// Full document text
    pub text: String,
}

impl IndexRequest {
    /// Create a new index request
    pub fn new(
        owner_id: impl Into<String>,
        document_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            document_id: document_id.into(),
            text: text.into(),
        }
    }
}

/// Request to answer a question over indexed documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Owner whose documents are searched
    pub owner_id: String,

    /// Restrict retrieval to these documents (optional)
    #[serde(default)]
    pub document_ids: Option<Vec<String>>,

    /// Number of chunks to retrieve (default comes from config)
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Whether to generate an answer from the retrieved chunks (default: true)
    #[serde(default = "default_generate")]
    pub generate: bool,
}

fn default_generate() -> bool {
    true
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            owner_id: owner_id.into(),
            document_ids: None,
            top_k: None,
            generate: true,
        }
    }

    /// Set the number of chunks to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Restrict retrieval to specific documents
    pub fn with_documents(mut self, document_ids: Vec<String>) -> Self {
        self.document_ids = Some(document_ids);
        self
    }

    /// Retrieve chunks without generating an answer
    pub fn without_generation(mut self) -> Self {
        self.generate = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults_to_true() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"question": "What is attention?", "owner_id": "alice"}"#)
                .unwrap();
        assert!(request.generate);
        assert!(request.top_k.is_none());
        assert!(request.document_ids.is_none());
    }

    #[test]
    fn test_builders() {
        let request = QueryRequest::new("What is attention?", "alice")
            .with_top_k(5)
            .with_documents(vec!["paper-1".to_string()])
            .without_generation();
        assert_eq!(request.top_k, Some(5));
        assert_eq!(request.document_ids.as_deref(), Some(&["paper-1".to_string()][..]));
        assert!(!request.generate);
    }
}
