mod classifier;
mod document_store;
mod embedding;
mod llm;
mod vector_store;

pub use classifier::{LabelScore, TicketClassifier};
pub use document_store::DocumentStore;
pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use vector_store::VectorStore;
