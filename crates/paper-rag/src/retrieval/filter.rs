//! Metadata filters scoping retrieval to an owner and optional documents

use crate::error::{Error, Result};
use crate::types::ChunkPayload;

/// Payload field names shared by every index backend
pub mod fields {
    /// Owner of the source document
    pub const OWNER_ID: &str = "owner_id";
    /// Source document identifier
    pub const DOCUMENT_ID: &str = "document_id";
    /// Chunk position within its document
    pub const CHUNK_INDEX: &str = "chunk_index";
    /// Chunk text, stored but never filtered on
    pub const TEXT: &str = "text";
}

/// A metadata predicate evaluated by the vector index during search
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value
    Eq(String, String),
    /// Field equals any of the values
    In(String, Vec<String>),
    /// All sub-filters hold
    And(Vec<Filter>),
}

impl Filter {
    /// Equality on a single field
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// Membership in a set of values
    pub fn any_of(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::In(field.into(), values)
    }

    /// Conjunction of filters
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    /// Evaluate this filter against a stored payload. Fields the payload
    /// does not carry match nothing.
    pub fn matches(&self, payload: &ChunkPayload) -> bool {
        match self {
            Filter::Eq(field, value) => {
                field_value(payload, field).is_some_and(|actual| actual == *value)
            }
            Filter::In(field, values) => {
                field_value(payload, field).is_some_and(|actual| values.contains(&actual))
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(payload)),
        }
    }
}

fn field_value(payload: &ChunkPayload, field: &str) -> Option<String> {
    match field {
        fields::OWNER_ID => Some(payload.owner_id.clone()),
        fields::DOCUMENT_ID => Some(payload.document_id.clone()),
        fields::CHUNK_INDEX => Some(payload.chunk_index.to_string()),
        _ => None,
    }
}

/// Builds the retrieval scope filter for a query
pub struct FilterBuilder;

impl FilterBuilder {
    /// Scope retrieval to one owner, optionally narrowed to specific
    /// documents. An empty document list retrieves across all of the
    /// owner's documents, same as no list at all.
    pub fn scope(owner_id: &str, document_ids: Option<&[String]>) -> Result<Filter> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(Error::validation("owner_id must not be empty"));
        }

        let owner = Filter::eq(fields::OWNER_ID, owner_id);

        match document_ids {
            Some(ids) if !ids.is_empty() => Ok(Filter::and(vec![
                owner,
                Filter::any_of(fields::DOCUMENT_ID, ids.to_vec()),
            ])),
            _ => Ok(owner),
        }
    }
}
