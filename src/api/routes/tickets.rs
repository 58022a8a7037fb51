use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::domain::TicketAnalysis;

#[derive(Debug, Deserialize)]
pub struct AnalyzeTicketRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TicketAnalysisResponse {
    pub primary_tag: String,
    pub solutions: Vec<String>,
    pub urgent: bool,
}

impl From<TicketAnalysis> for TicketAnalysisResponse {
    fn from(analysis: TicketAnalysis) -> Self {
        Self {
            primary_tag: analysis.primary_tag.label().to_string(),
            solutions: analysis.solutions,
            urgent: analysis.urgent,
        }
    }
}

pub async fn analyze_ticket(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTicketRequest>,
) -> Result<Json<TicketAnalysisResponse>, StatusCode> {
    if request.text.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let analysis = state.ticket_service.analyze(&request.text).await;
    Ok(Json(analysis.into()))
}
