use crate::domain::errors::DomainError;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Zero-shot classification over a caller-supplied label vocabulary.
/// Implementations return labels ranked by score, highest first.
#[async_trait]
pub trait TicketClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Vec<LabelScore>, DomainError>;
}
