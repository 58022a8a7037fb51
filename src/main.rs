use desk_agent::api::{create_router, queue, AppState};
use desk_agent::application::{DocumentService, RagService, TicketService};
use desk_agent::domain::ports::TicketClassifier;
use desk_agent::infrastructure::{
    AppConfig, HfZeroShotClassifier, InMemoryDocumentStore, QdrantVectorStore, TextEmbedding,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,desk_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let app_config = AppConfig::load()?;
    let config = app_config.config.clone();

    let redis_pool = queue::create_pool(&config.redis_url)?;
    info!("Redis pool initialized");

    let embedding = Arc::new(TextEmbedding::from_config(&config.embedding));
    let vector_store = Arc::new(
        QdrantVectorStore::new(
            &config.qdrant_url,
            &config.collection,
            config.embedding.dimension,
        )
        .await?,
    );
    info!("Qdrant connected");

    let rag_service = Arc::new(RagService::new(embedding, vector_store, config.rag.top_k));
    let document_service = Arc::new(DocumentService::with_chunking(
        Arc::new(InMemoryDocumentStore::new()),
        config.rag.chunk_size,
        config.rag.chunk_overlap,
    ));

    let classifier = match HfZeroShotClassifier::from_env(&config.classifier) {
        Some(c) => Some(Arc::new(c) as Arc<dyn TicketClassifier>),
        None => {
            warn!("HF_API_TOKEN not set, ticket tagging uses the keyword fallback only");
            None
        }
    };
    let ticket_service = Arc::new(TicketService::new(
        classifier,
        config.classifier.confidence_threshold,
    ));

    let state = AppState::new(
        redis_pool,
        app_config,
        document_service,
        rag_service,
        ticket_service,
    );
    let app = create_router(state);

    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()?;
    let addr = SocketAddr::new(host.parse()?, port);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
