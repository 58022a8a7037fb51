use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DocumentChunk;

pub mod queues {
    pub const CHAT_QUEUE: &str = "jobs:chat";
    pub const INGEST_QUEUE: &str = "jobs:ingest";
}

pub mod keys {
    use uuid::Uuid;

    pub fn job_status(job_id: &Uuid) -> String {
        format!("job:status:{}", job_id)
    }

    pub fn conversation(conversation_id: &Uuid) -> String {
        format!("conversation:{}", conversation_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: Uuid,
    pub status: QueueJobStatus,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobResult {
    pub fn pending(job_id: Uuid) -> Self {
        Self {
            job_id,
            status: QueueJobStatus::Pending,
            result: None,
            error: None,
            completed_at: None,
        }
    }

    pub fn processing(job_id: Uuid) -> Self {
        Self {
            job_id,
            status: QueueJobStatus::Processing,
            result: None,
            error: None,
            completed_at: None,
        }
    }

    pub fn completed(job_id: Uuid, result: serde_json::Value) -> Self {
        Self {
            job_id,
            status: QueueJobStatus::Completed,
            result: Some(result),
            error: None,
            completed_at: Some(Utc::now()),
        }
    }

    pub fn failed(job_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            job_id,
            status: QueueJobStatus::Failed,
            result: None,
            error: Some(error.into()),
            completed_at: Some(Utc::now()),
        }
    }
}

/// A queued retrieval-augmented question. The answer, its timing, and its
/// source count come back through the job status record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessChatJob {
    pub job_id: Uuid,
    pub message: String,
    pub conversation_id: Option<Uuid>,
}

impl ProcessChatJob {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            message: message.into(),
            conversation_id: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: Uuid) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }
}

/// Chunks to embed and index. Chunk identity is fixed at ingest time so the
/// vector payloads and the document record always agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestDocumentJob {
    pub job_id: Uuid,
    pub document_id: Uuid,
    pub chunks: Vec<DocumentChunk>,
}

impl IngestDocumentJob {
    pub fn new(document_id: Uuid, chunks: Vec<DocumentChunk>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            document_id,
            chunks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_result_round_trips_through_json() {
        let job_id = Uuid::new_v4();
        let result = JobResult::completed(job_id, serde_json::json!({"answer": "ok"}));

        let json = serde_json::to_string(&result).unwrap();
        let parsed: JobResult = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.job_id, job_id);
        assert_eq!(parsed.status, QueueJobStatus::Completed);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&QueueJobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
