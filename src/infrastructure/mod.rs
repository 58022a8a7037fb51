pub mod classifier;
pub mod config;
pub mod document_store;
pub mod embedding;
pub mod extract;
pub mod llm;
pub mod queue;
pub mod vector_store;

pub use classifier::HfZeroShotClassifier;
pub use config::{AppConfig, Config, PromptsConfig};
pub use document_store::InMemoryDocumentStore;
pub use embedding::TextEmbedding;
pub use llm::AnthropicLlm;
pub use queue::{
    keys, queues, ConversationStore, IngestDocumentJob, JobResult, ProcessChatJob, QueueJobStatus,
};
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
