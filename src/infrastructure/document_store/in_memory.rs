use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::{ports::DocumentStore, Document, DocumentChunk, DomainError};

/// Process-local document registry. Document metadata and chunks are
/// ephemeral by design; the durable representation lives in the vector store.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
    chunks: RwLock<HashMap<Uuid, Vec<DocumentChunk>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            chunks: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save_document(&self, doc: &Document) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        documents.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(documents.get(&id).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut all: Vec<Document> = documents.values().cloned().collect();
        all.sort_by_key(|d| d.created_at);
        Ok(all)
    }

    async fn delete_document(&self, id: Uuid) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let mut chunks = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        documents.remove(&id);
        chunks.remove(&id);
        Ok(())
    }

    async fn save_chunks(&self, new_chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        let mut chunks = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        for chunk in new_chunks {
            chunks
                .entry(chunk.document_id)
                .or_default()
                .push(chunk.clone());
        }
        Ok(())
    }

    async fn get_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>, DomainError> {
        let chunks = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(chunks.get(&document_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_list_documents() {
        let store = InMemoryDocumentStore::new();
        let first = Document::new("first.txt");
        let second = Document::new("second.txt");

        store.save_document(&first).await.unwrap();
        store.save_document(&second).await.unwrap();

        let listed = store.list_documents().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at <= listed[1].created_at);
    }

    #[tokio::test]
    async fn test_delete_removes_chunks_too() {
        let store = InMemoryDocumentStore::new();
        let doc = Document::new("doc.txt");
        store.save_document(&doc).await.unwrap();
        store
            .save_chunks(&[DocumentChunk::new(doc.id, "part", 0)])
            .await
            .unwrap();

        store.delete_document(doc.id).await.unwrap();

        assert!(store.get_document(doc.id).await.unwrap().is_none());
        assert!(store.get_chunks(doc.id).await.unwrap().is_empty());
    }
}
