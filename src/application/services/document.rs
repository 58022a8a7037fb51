use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{chunk_text, ports::DocumentStore, Document, DocumentChunk, DomainError};

pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }

    pub fn with_chunking(
        store: Arc<dyn DocumentStore>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            store,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validates, persists, and chunks raw text. Empty or whitespace-only
    /// content is rejected before any store call.
    #[instrument(skip(self, content), fields(name))]
    pub async fn ingest(
        &self,
        name: &str,
        content: &str,
    ) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        self.ingest_with_type(name, "text/plain", content).await
    }

    #[instrument(skip(self, content), fields(name, content_type))]
    pub async fn ingest_with_type(
        &self,
        name: &str,
        content_type: &str,
        content: &str,
    ) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("document content must not be empty"));
        }

        let doc = Document::new(name).with_content_type(content_type);
        self.store.save_document(&doc).await?;

        let chunks = chunk_text(doc.id, content, self.chunk_size, self.chunk_overlap);
        if !chunks.is_empty() {
            self.store.save_chunks(&chunks).await?;
        }

        Ok((doc, chunks))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        self.store.get_document(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_with_chunks(
        &self,
        id: Uuid,
    ) -> Result<Option<(Document, Vec<DocumentChunk>)>, DomainError> {
        match self.store.get_document(id).await? {
            Some(doc) => {
                let chunks = self.store.get_chunks(id).await?;
                Ok(Some((doc, chunks)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Document>, DomainError> {
        self.store.list_documents().await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.store.delete_document(id).await
    }
}
