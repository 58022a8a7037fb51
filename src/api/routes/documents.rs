use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::api::routes::status_for;
use crate::api::state::AppState;
use crate::domain::{Document, DocumentChunk};
use crate::infrastructure::{extract, IngestDocumentJob};

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub name: String,
    pub content: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            content_type: doc.content_type,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateDocumentResponse {
    pub document: DocumentResponse,
    pub chunks: usize,
    pub job_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SearchDocumentsRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub documents: usize,
    pub chunks_indexed: usize,
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<Json<CreateDocumentResponse>, StatusCode> {
    let content_type = request.content_type.as_deref().unwrap_or("text/plain");

    let (doc, chunks) = state
        .document_service
        .ingest_with_type(&request.name, content_type, &request.content)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create document");
            status_for(&e)
        })?;

    let chunk_count = chunks.len();
    let job_id = enqueue_indexing(&state, &doc, chunks).await?;

    Ok(Json(CreateDocumentResponse {
        document: DocumentResponse::from(doc),
        chunks: chunk_count,
        job_id,
    }))
}

/// Multipart PDF/TXT upload. The file lands on a temporary path which is
/// removed again whether or not extraction and ingestion succeeded.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreateDocumentResponse>, StatusCode> {
    let mut uploaded: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload.txt").to_string();
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            uploaded = Some((file_name, data));
        }
    }

    let Some((file_name, data)) = uploaded else {
        return Err(StatusCode::BAD_REQUEST);
    };

    let file_name = sanitize_file_name(&file_name);
    if !extract::is_supported(&file_name) {
        return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
    if data.len() > state.config.config.upload.max_bytes {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }

    let temp_dir = PathBuf::from(&state.config.config.upload.temp_dir);
    tokio::fs::create_dir_all(&temp_dir).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create upload dir");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let temp_path = temp_dir.join(format!("{}-{}", Uuid::new_v4(), file_name));
    tokio::fs::write(&temp_path, &data).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to write upload");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let outcome = process_upload(&state, &temp_path, &file_name).await;
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        tracing::warn!(error = %e, path = %temp_path.display(), "Failed to remove temp upload");
    }

    let (doc, chunks) = outcome?;
    let chunk_count = chunks.len();
    let job_id = enqueue_indexing(&state, &doc, chunks).await?;

    Ok(Json(CreateDocumentResponse {
        document: DocumentResponse::from(doc),
        chunks: chunk_count,
        job_id,
    }))
}

async fn process_upload(
    state: &AppState,
    path: &std::path::Path,
    file_name: &str,
) -> Result<(Document, Vec<DocumentChunk>), StatusCode> {
    let text = extract::extract_text(path).await.map_err(|e| {
        tracing::warn!(error = %e, file_name, "Extraction failed");
        status_for(&e)
    })?;

    state
        .document_service
        .ingest_with_type(file_name, extract::content_type_of(file_name), &text)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, file_name, "Failed to ingest upload");
            status_for(&e)
        })
}

async fn enqueue_indexing(
    state: &AppState,
    doc: &Document,
    chunks: Vec<DocumentChunk>,
) -> Result<Uuid, StatusCode> {
    let job = IngestDocumentJob::new(doc.id, chunks);
    state.job_producer.push_ingest_job(&job).await.map_err(|e| {
        tracing::error!(error = %e, document_id = %doc.id, "Failed to queue ingest job");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

fn sanitize_file_name(name: &str) -> String {
    std::path::Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.txt")
        .to_string()
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, StatusCode> {
    match state.document_service.get(id).await {
        Ok(Some(doc)) => Ok(Json(DocumentResponse::from(doc))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get document");
            Err(status_for(&e))
        }
    }
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentResponse>>, StatusCode> {
    let docs = state.document_service.list().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list documents");
        status_for(&e)
    })?;

    Ok(Json(docs.into_iter().map(DocumentResponse::from).collect()))
}

/// Removes both the document record and its indexed vectors.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    state.document_service.delete(id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to delete document");
        status_for(&e)
    })?;

    state.rag_service.delete_document(id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to delete document vectors");
        status_for(&e)
    })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_documents(
    State(state): State<AppState>,
    Json(request): Json<SearchDocumentsRequest>,
) -> Result<Json<Vec<SearchResultResponse>>, StatusCode> {
    if request.query.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let top_k = request.limit.unwrap_or(state.config.config.rag.top_k);
    let results = state
        .rag_service
        .retrieve_top_k(&request.query, top_k)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Search failed");
            status_for(&e)
        })?;

    Ok(Json(
        results
            .into_iter()
            .map(|r| SearchResultResponse {
                chunk_id: r.chunk.id,
                document_id: r.chunk.document_id,
                content: r.chunk.content,
                score: r.score,
            })
            .collect(),
    ))
}

pub async fn document_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, StatusCode> {
    let documents = state
        .document_service
        .list()
        .await
        .map_err(|e| status_for(&e))?
        .len();

    let chunks_indexed = state
        .rag_service
        .count()
        .await
        .map_err(|e| status_for(&e))?;

    Ok(Json(StatsResponse {
        documents,
        chunks_indexed,
    }))
}
