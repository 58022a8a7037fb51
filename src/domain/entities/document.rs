use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            content_type: "text/plain".to_string(),
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(document_id: Uuid, content: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content: content.into(),
            chunk_index,
            metadata: ChunkMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub page: Option<usize>,
    pub section: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Splits content into fixed-size character chunks.
///
/// Consecutive chunks share `overlap` characters; the window advances by
/// `chunk_size - overlap` (at least 1). Splitting happens on `char`
/// boundaries, so multi-byte text is never cut mid-scalar. The same content
/// with the same parameters always yields the same ordered chunk sequence.
/// Whitespace-only content produces no chunks.
pub fn chunk_text(
    document_id: Uuid,
    content: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<DocumentChunk> {
    if chunk_size == 0 {
        return Vec::new();
    }

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_index = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let piece: String = chars[start..end].iter().collect();
        chunks.push(DocumentChunk::new(document_id, piece, chunk_index));
        chunk_index += 1;

        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_single_chunk() {
        let doc_id = Uuid::new_v4();
        let chunks = chunk_text(doc_id, "hello world", 100, 0);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "hello world");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn test_chunk_text_fixed_size_no_overlap() {
        let doc_id = Uuid::new_v4();
        let chunks = chunk_text(doc_id, "abcdefghij", 4, 0);

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcd", "efgh", "ij"]);
        assert_eq!(chunks[2].chunk_index, 2);
    }

    #[test]
    fn test_chunk_text_with_overlap() {
        let doc_id = Uuid::new_v4();
        let chunks = chunk_text(doc_id, "abcdefghij", 4, 2);

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcd", "cdef", "efgh", "ghij"]);
    }

    #[test]
    fn test_chunk_text_deterministic() {
        let doc_id = Uuid::new_v4();
        let content = "The quick brown fox jumps over the lazy dog. ".repeat(40);

        let first: Vec<String> = chunk_text(doc_id, &content, 500, 200)
            .into_iter()
            .map(|c| c.content)
            .collect();
        let second: Vec<String> = chunk_text(doc_id, &content, 500, 200)
            .into_iter()
            .map(|c| c.content)
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_chunk_text_multibyte_boundaries() {
        let doc_id = Uuid::new_v4();
        let chunks = chunk_text(doc_id, "héllo wörld ünïcode", 5, 1);

        // Chunk contents must re-join to cover the input without panicking.
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 5);
        }
    }

    #[test]
    fn test_chunk_text_empty() {
        let doc_id = Uuid::new_v4();
        assert!(chunk_text(doc_id, "", 100, 0).is_empty());
        assert!(chunk_text(doc_id, "   \n\t ", 100, 0).is_empty());
    }

    #[test]
    fn test_chunk_text_overlap_at_least_advances() {
        let doc_id = Uuid::new_v4();
        // Overlap >= chunk size still terminates, advancing one char at a time.
        let chunks = chunk_text(doc_id, "abcde", 3, 3);
        assert_eq!(chunks[0].content, "abc");
        assert!(chunks.len() <= 5);
    }
}
