mod conversation;
mod document;
mod embedding;
mod ticket;

pub use conversation::{Conversation, Message, MessageRole};
pub use document::{chunk_text, ChunkMetadata, Document, DocumentChunk, SearchResult};
pub use embedding::Embedding;
pub use ticket::{normalize_ticket_text, Tag, TicketAnalysis, URGENCY_KEYWORDS};
