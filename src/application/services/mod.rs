mod answer;
mod document;
mod rag;
mod ticket;

pub use answer::{AnswerService, RagAnswer};
pub use document::DocumentService;
pub use rag::RagService;
pub use ticket::TicketService;
