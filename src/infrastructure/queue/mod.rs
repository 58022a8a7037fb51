mod conversations;
mod jobs;

pub use conversations::ConversationStore;
pub use jobs::{keys, queues, IngestDocumentJob, JobResult, ProcessChatJob, QueueJobStatus};
