use deadpool_redis::{redis::AsyncCommands, Config, Connection, Pool, Runtime};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use desk_agent::application::{AnswerService, RagService};
use desk_agent::domain::{Conversation, MessageRole};
use desk_agent::infrastructure::{
    keys, queues, AnthropicLlm, AppConfig, ConversationStore, IngestDocumentJob, JobResult,
    ProcessChatJob, QdrantVectorStore, TextEmbedding,
};

pub type RedisPool = Pool;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Redis pool error: {0}")]
    Pool(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Processing error: {0}")]
    Processing(String),
}

pub type Result<T> = std::result::Result<T, WorkerError>;

pub fn create_pool(redis_url: &str) -> Result<RedisPool> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| WorkerError::Pool(e.to_string()))
}

pub struct WorkerState {
    pub redis_pool: RedisPool,
    pub answer: Arc<AnswerService>,
    pub rag: Arc<RagService>,
    pub conversations: ConversationStore,
    pub result_ttl_seconds: u64,
}

impl WorkerState {
    pub async fn new(redis_pool: RedisPool, config: &AppConfig) -> anyhow::Result<Self> {
        let cfg = &config.config;

        let embedding = Arc::new(TextEmbedding::from_config(&cfg.embedding));
        let vector_store = Arc::new(
            QdrantVectorStore::new(&cfg.qdrant_url, &cfg.collection, cfg.embedding.dimension)
                .await?,
        );
        let rag = Arc::new(RagService::new(embedding, vector_store, cfg.rag.top_k));

        let llm = Arc::new(AnthropicLlm::from_config(&cfg.llm));
        let answer = Arc::new(
            AnswerService::new(rag.clone(), llm, cfg.rag.top_k)
                .with_template(config.prompts.rag.template.clone())
                .with_system_prompt(config.prompts.agent.system.clone()),
        );

        let conversations = ConversationStore::new(
            redis_pool.clone(),
            cfg.worker.conversation_ttl_seconds,
        );

        Ok(Self {
            redis_pool,
            answer,
            rag,
            conversations,
            result_ttl_seconds: cfg.worker.result_ttl_seconds,
        })
    }
}

pub struct JobConsumer {
    state: Arc<WorkerState>,
    concurrency: usize,
}

impl JobConsumer {
    pub fn new(state: WorkerState, concurrency: usize) -> Self {
        Self {
            state: Arc::new(state),
            concurrency,
        }
    }

    pub async fn start(&self) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        tracing::info!(concurrency = self.concurrency, "consumer started");

        loop {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let state = self.state.clone();

            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = process_next_job(&state).await {
                    tracing::error!(error = %e, "job failed");
                }
            });

            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    }
}

async fn conn(state: &WorkerState) -> Result<Connection> {
    state
        .redis_pool
        .get()
        .await
        .map_err(|e| WorkerError::Pool(e.to_string()))
}

async fn set_status(conn: &mut Connection, job_id: uuid::Uuid, status: &JobResult, ttl: u64) -> Result<()> {
    let json = serde_json::to_string(status)?;
    conn.set_ex::<_, _, ()>(keys::job_status(&job_id), &json, ttl)
        .await
        .map_err(|e| WorkerError::Redis(e.to_string()))
}

async fn process_next_job(state: &WorkerState) -> Result<()> {
    let mut c = conn(state).await?;

    let result: Option<(String, String)> = c
        .brpop(&[queues::CHAT_QUEUE, queues::INGEST_QUEUE], 1.0)
        .await
        .map_err(|e| WorkerError::Redis(e.to_string()))?;

    if let Some((queue, job_json)) = result {
        match queue.as_str() {
            q if q == queues::CHAT_QUEUE => {
                process_chat_job(state, serde_json::from_str(&job_json)?).await?;
            }
            q if q == queues::INGEST_QUEUE => {
                process_ingest_job(state, serde_json::from_str(&job_json)?).await?;
            }
            _ => tracing::warn!(queue, "unknown queue"),
        }
    }
    Ok(())
}

async fn process_chat_job(state: &WorkerState, job: ProcessChatJob) -> Result<()> {
    tracing::info!(job_id = %job.job_id, "processing chat");
    let mut c = conn(state).await?;
    let ttl = state.result_ttl_seconds;

    set_status(&mut c, job.job_id, &JobResult::processing(job.job_id), ttl).await?;

    let mut conversation = match job.conversation_id {
        Some(id) => match state.conversations.get(id).await {
            Ok(Some(existing)) => existing,
            Ok(None) => Conversation::with_id(id),
            Err(e) => {
                tracing::warn!(error = %e, conversation_id = %id, "history unavailable");
                Conversation::with_id(id)
            }
        },
        None => Conversation::new(),
    };

    let response = state.answer.answer(&job.message, &conversation.messages).await;

    match response {
        Ok(answer) => {
            conversation.add_message(MessageRole::User, &job.message);
            conversation.add_message(MessageRole::Assistant, &answer.text);
            if let Err(e) = state.conversations.save(&conversation).await {
                tracing::warn!(error = %e, "failed to save conversation");
            }

            let formatted = answer.formatted();
            set_status(
                &mut c,
                job.job_id,
                &JobResult::completed(
                    job.job_id,
                    serde_json::json!({
                        "answer": answer.text,
                        "formatted": formatted,
                        "elapsed_seconds": answer.elapsed.as_secs_f64(),
                        "sources": answer.sources,
                        "conversation_id": conversation.id,
                    }),
                ),
                ttl,
            )
            .await?;
        }
        Err(e) => {
            set_status(
                &mut c,
                job.job_id,
                &JobResult::failed(job.job_id, e.to_string()),
                ttl,
            )
            .await?;
        }
    }

    tracing::info!(job_id = %job.job_id, "chat completed");
    Ok(())
}

async fn process_ingest_job(state: &WorkerState, job: IngestDocumentJob) -> Result<()> {
    tracing::info!(job_id = %job.job_id, document_id = %job.document_id, "processing ingest");
    let mut c = conn(state).await?;
    let ttl = state.result_ttl_seconds;

    set_status(&mut c, job.job_id, &JobResult::processing(job.job_id), ttl).await?;

    match state.rag.index_chunks(&job.chunks).await {
        Ok(()) => {
            set_status(
                &mut c,
                job.job_id,
                &JobResult::completed(
                    job.job_id,
                    serde_json::json!({
                        "document_id": job.document_id,
                        "chunks_indexed": job.chunks.len(),
                    }),
                ),
                ttl,
            )
            .await?;
        }
        Err(e) => {
            set_status(
                &mut c,
                job.job_id,
                &JobResult::failed(job.job_id, e.to_string()),
                ttl,
            )
            .await?;
        }
    }

    tracing::info!(job_id = %job.job_id, "ingest completed");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worker=debug,desk_agent=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let redis_pool = create_pool(&config.config.redis_url)?;
    info!("Redis connected");

    let concurrency: usize = std::env::var("WORKER_CONCURRENCY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(config.config.worker.concurrency);

    let state = WorkerState::new(redis_pool, &config).await?;
    info!("Qdrant connected");

    let consumer = JobConsumer::new(state, concurrency);

    info!(concurrency, "worker started");
    consumer.start().await?;

    Ok(())
}
