use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DocumentChunk, DomainError, SearchResult,
};

/// The knowledge-base handle: embedding plus vector search behind one seam.
/// Owned by the caller and passed in explicitly; no process-wide singletons.
pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    default_top_k: usize,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            default_top_k,
        }
    }

    #[instrument(skip(self), fields(top_k))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        self.retrieve_top_k(query, self.default_top_k).await
    }

    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        self.vector_store.search(&embedding, top_k).await
    }

    #[instrument(skip(self, chunk), fields(chunk_id = %chunk.id))]
    pub async fn index_chunk(&self, chunk: &DocumentChunk) -> Result<(), DomainError> {
        let embedding = self.embedding.embed(&chunk.content).await?;
        self.vector_store.upsert(chunk, &embedding).await
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn index_chunks(&self, chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            self.vector_store.upsert(chunk, embedding).await?;
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_document(&self, document_id: uuid::Uuid) -> Result<(), DomainError> {
        self.vector_store.delete_by_document(document_id).await
    }

    /// Index size, surfaced as the "documents indexed" metric.
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.vector_store.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Embedding;
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct LengthEmbedding;

    #[async_trait]
    impl EmbeddingService for LengthEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            Ok(Embedding::new(vec![text.len() as f32, 1.0]))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Ok(texts
                .iter()
                .map(|t| Embedding::new(vec![t.len() as f32, 1.0]))
                .collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn chunks_of(doc_id: Uuid, texts: &[&str]) -> Vec<DocumentChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| DocumentChunk::new(doc_id, *t, i))
            .collect()
    }

    #[tokio::test]
    async fn test_index_chunks_grows_count_by_chunk_number() {
        let rag = RagService::new(
            std::sync::Arc::new(LengthEmbedding),
            std::sync::Arc::new(InMemoryVectorStore::new()),
            3,
        );
        let doc_id = Uuid::new_v4();

        rag.index_chunks(&chunks_of(doc_id, &["one", "two", "three"]))
            .await
            .unwrap();
        assert_eq!(rag.count().await.unwrap(), 3);

        rag.index_chunks(&chunks_of(doc_id, &["four", "five"]))
            .await
            .unwrap();
        assert_eq!(rag.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_delete_document_clears_its_chunks() {
        let rag = RagService::new(
            std::sync::Arc::new(LengthEmbedding),
            std::sync::Arc::new(InMemoryVectorStore::new()),
            3,
        );
        let keep = Uuid::new_v4();
        let removed = Uuid::new_v4();

        rag.index_chunks(&chunks_of(keep, &["kept"])).await.unwrap();
        rag.index_chunks(&chunks_of(removed, &["dropped a", "dropped b"]))
            .await
            .unwrap();

        rag.delete_document(removed).await.unwrap();
        assert_eq!(rag.count().await.unwrap(), 1);
    }
}
