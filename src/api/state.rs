use std::sync::Arc;

use crate::api::queue::{JobProducer, RedisPool};
use crate::application::{DocumentService, RagService, TicketService};
use crate::infrastructure::{AppConfig, ConversationStore};

/// Explicitly wired context for every handler: knowledge-base services,
/// ticket analysis, the job producer, and conversation history. Built once at
/// startup; no implicit process-wide caching.
#[derive(Clone)]
pub struct AppState {
    pub redis_pool: RedisPool,
    pub job_producer: JobProducer,
    pub document_service: Arc<DocumentService>,
    pub rag_service: Arc<RagService>,
    pub ticket_service: Arc<TicketService>,
    pub conversations: ConversationStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        redis_pool: RedisPool,
        config: AppConfig,
        document_service: Arc<DocumentService>,
        rag_service: Arc<RagService>,
        ticket_service: Arc<TicketService>,
    ) -> Self {
        let config = Arc::new(config);
        let job_producer = JobProducer::new(
            redis_pool.clone(),
            config.config.worker.result_ttl_seconds,
        );
        let conversations = ConversationStore::new(
            redis_pool.clone(),
            config.config.worker.conversation_ttl_seconds,
        );

        Self {
            redis_pool,
            job_producer,
            document_service,
            rag_service,
            ticket_service,
            conversations,
            config,
        }
    }
}
