use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{
    ports::{LabelScore, TicketClassifier},
    DomainError,
};
use crate::infrastructure::config::ClassifierConfig;

/// Zero-shot classification against the Hugging Face inference API. The model
/// scores the text against the caller's candidate labels; ranking comes back
/// highest-score-first from the endpoint.
pub struct HfZeroShotClassifier {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
    multi_label: bool,
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

impl HfZeroShotClassifier {
    pub fn new(config: &ClassifierConfig, token: Option<String>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}/{}", config.endpoint.trim_end_matches('/'), config.model),
            token,
        })
    }

    /// Builds the classifier only when an inference token is present in the
    /// environment; callers treat `None` as "model unavailable" and rely on
    /// the keyword fallback.
    pub fn from_env(config: &ClassifierConfig) -> Option<Self> {
        let token = std::env::var("HF_API_TOKEN").ok()?;
        Self::new(config, Some(token)).ok()
    }
}

#[async_trait]
impl TicketClassifier for HfZeroShotClassifier {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Vec<LabelScore>, DomainError> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels,
                multi_label: true,
            },
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::external(format!(
                "classification endpoint returned {status}: {detail}"
            )));
        }

        let parsed: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(parsed
            .labels
            .into_iter()
            .zip(parsed.scores)
            .map(|(label, score)| LabelScore { label, score })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let labels = ["Software Bug", "Payment Issue"];
        let body = ZeroShotRequest {
            inputs: "the app crashes",
            parameters: ZeroShotParameters {
                candidate_labels: &labels,
                multi_label: true,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "the app crashes");
        assert_eq!(json["parameters"]["multi_label"], true);
        assert_eq!(json["parameters"]["candidate_labels"][1], "Payment Issue");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"sequence":"x","labels":["Payment Issue","Software Bug"],"scores":[0.91,0.12]}"#;
        let parsed: ZeroShotResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.labels[0], "Payment Issue");
        assert!((parsed.scores[0] - 0.91).abs() < f32::EPSILON);
    }
}
