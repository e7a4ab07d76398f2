//! Chunk and vector record types with deterministic identity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A contiguous slice of a document produced by the chunker
///
/// Chunks are ordered by `index` and overlap their neighbors by the
/// configured number of characters. The same document text always produces
/// the same chunk sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Owner of the document
    pub owner_id: String,
    /// Document this chunk belongs to
    pub document_id: String,
    /// Zero-based position within the document
    pub index: u32,
    /// Chunk text
    pub text: String,
}

impl Chunk {
    /// Composite key identifying this chunk across re-index runs.
    /// Re-indexing the same document overwrites rather than duplicates.
    pub fn vector_key(&self) -> String {
        format!("{}:{}:{}", self.owner_id, self.document_id, self.index)
    }

    /// Stable point ID derived from the composite key
    pub fn point_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.vector_key().as_bytes())
    }

    /// Pair this chunk with its embedding for indexing
    pub fn into_record(self, vector: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: self.point_id(),
            vector,
            payload: ChunkPayload {
                owner_id: self.owner_id,
                document_id: self.document_id,
                chunk_index: self.index,
                text: self.text,
            },
        }
    }
}

/// Metadata stored alongside each vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkPayload {
    /// Owner of the document
    pub owner_id: String,
    /// Document this chunk belongs to
    pub document_id: String,
    /// Zero-based position within the document
    pub chunk_index: u32,
    /// Chunk text
    pub text: String,
}

/// An embedded chunk ready to be written to the vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Deterministic point ID
    pub id: Uuid,
    /// L2-normalized embedding
    pub vector: Vec<f32>,
    /// Chunk metadata
    pub payload: ChunkPayload,
}

/// A single match returned by a vector index query
#[derive(Debug, Clone)]
pub struct VectorHit {
    /// Cosine similarity to the query vector
    pub similarity: f32,
    /// Stored chunk metadata
    pub payload: ChunkPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(owner: &str, doc: &str, index: u32) -> Chunk {
        Chunk {
            owner_id: owner.to_string(),
            document_id: doc.to_string(),
            index,
            text: "some text".to_string(),
        }
    }

    #[test]
    fn test_vector_key_format() {
        let c = chunk("alice", "paper-1", 3);
        assert_eq!(c.vector_key(), "alice:paper-1:3");
    }

    #[test]
    fn test_point_id_deterministic() {
        let a = chunk("alice", "paper-1", 0);
        let b = chunk("alice", "paper-1", 0);
        assert_eq!(a.point_id(), b.point_id());
    }

    #[test]
    fn test_point_id_distinct_per_chunk() {
        let ids = [
            chunk("alice", "paper-1", 0).point_id(),
            chunk("alice", "paper-1", 1).point_id(),
            chunk("alice", "paper-2", 0).point_id(),
            chunk("bob", "paper-1", 0).point_id(),
        ];
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                assert_ne!(ids[i], ids[j]);
            }
        }
    }

    #[test]
    fn test_into_record_carries_payload() {
        let c = chunk("alice", "paper-1", 2);
        let id = c.point_id();
        let record = c.into_record(vec![0.6, 0.8]);
        assert_eq!(record.id, id);
        assert_eq!(record.payload.owner_id, "alice");
        assert_eq!(record.payload.document_id, "paper-1");
        assert_eq!(record.payload.chunk_index, 2);
        assert_eq!(record.payload.text, "some text");
    }
}
