use std::sync::Arc;
use tracing::{instrument, warn};

use crate::domain::{
    normalize_ticket_text,
    ports::TicketClassifier,
    Tag, TicketAnalysis, URGENCY_KEYWORDS,
};

/// Two-tier ticket tagging: a zero-shot model when one is configured and
/// confident, a keyword count otherwise. Classification never fails the
/// request; every error path degrades to a usable analysis.
pub struct TicketService {
    classifier: Option<Arc<dyn TicketClassifier>>,
    confidence_threshold: f32,
}

impl TicketService {
    pub fn new(classifier: Option<Arc<dyn TicketClassifier>>, confidence_threshold: f32) -> Self {
        Self {
            classifier,
            confidence_threshold,
        }
    }

    #[instrument(skip(self, text))]
    pub async fn analyze(&self, text: &str) -> TicketAnalysis {
        let normalized = normalize_ticket_text(text);
        let urgent = URGENCY_KEYWORDS.iter().any(|k| normalized.contains(k));

        let primary_tag = match self.model_tag(&normalized).await {
            Ok(Some(tag)) => tag,
            Ok(None) => keyword_tag(&normalized),
            Err(e) => {
                warn!(error = %e, "classification failed, degrading to general tag");
                Tag::General
            }
        };

        TicketAnalysis::new(primary_tag, urgent)
    }

    /// Returns `Ok(Some(tag))` only when the classifier is configured and its
    /// top label clears the confidence threshold.
    async fn model_tag(&self, normalized: &str) -> Result<Option<Tag>, crate::domain::DomainError> {
        let Some(classifier) = &self.classifier else {
            return Ok(None);
        };

        let labels: Vec<&str> = Tag::CANDIDATES.iter().map(|t| t.label()).collect();
        let scored = classifier.classify(normalized, &labels).await?;

        let Some(top) = scored.first() else {
            return Ok(None);
        };

        if top.score > self.confidence_threshold {
            Ok(Tag::from_label(&top.label))
        } else {
            Ok(None)
        }
    }
}

/// Counts, per candidate tag, how many of its keywords appear as substrings of
/// the normalized text; the highest count wins and ties resolve to the first
/// declared tag.
fn keyword_tag(normalized: &str) -> Tag {
    let mut best = Tag::CANDIDATES[0];
    let mut best_score = keyword_score(best, normalized);

    for tag in &Tag::CANDIDATES[1..] {
        let score = keyword_score(*tag, normalized);
        if score > best_score {
            best = *tag;
            best_score = score;
        }
    }

    best
}

fn keyword_score(tag: Tag, normalized: &str) -> usize {
    tag.keywords()
        .iter()
        .filter(|k| normalized.contains(*k))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::LabelScore;
    use crate::domain::DomainError;
    use async_trait::async_trait;

    struct FixedClassifier {
        label: &'static str,
        score: f32,
    }

    #[async_trait]
    impl TicketClassifier for FixedClassifier {
        async fn classify(
            &self,
            _text: &str,
            _candidate_labels: &[&str],
        ) -> Result<Vec<LabelScore>, DomainError> {
            Ok(vec![LabelScore {
                label: self.label.to_string(),
                score: self.score,
            }])
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl TicketClassifier for FailingClassifier {
        async fn classify(
            &self,
            _text: &str,
            _candidate_labels: &[&str],
        ) -> Result<Vec<LabelScore>, DomainError> {
            Err(DomainError::external("inference endpoint down"))
        }
    }

    fn keyword_only() -> TicketService {
        TicketService::new(None, 0.7)
    }

    #[tokio::test]
    async fn test_crash_report_tags_software_bug() {
        let analysis = keyword_only()
            .analyze("The app crashes when uploading PDF files")
            .await;

        assert_eq!(analysis.primary_tag, Tag::SoftwareBug);
        assert!(!analysis.urgent);
        assert_eq!(analysis.solutions[0], "1. Restart the application");
    }

    #[tokio::test]
    async fn test_urgent_payment_ticket() {
        let analysis = keyword_only()
            .analyze("URGENT: payment refund not processed, $50 charged twice")
            .await;

        assert_eq!(analysis.primary_tag, Tag::PaymentIssue);
        assert!(analysis.urgent);
    }

    #[tokio::test]
    async fn test_urgency_is_case_insensitive_substring() {
        let svc = keyword_only();
        assert!(svc.analyze("please fix IMMEDIATELY").await.urgent);
        assert!(svc.analyze("this is critical!").await.urgent);
        assert!(!svc.analyze("minor cosmetic issue").await.urgent);
    }

    #[tokio::test]
    async fn test_zero_matches_fall_back_to_first_declared_tag() {
        let analysis = keyword_only().analyze("something unrelated entirely").await;
        assert_eq!(analysis.primary_tag, Tag::SoftwareBug);
    }

    #[tokio::test]
    async fn test_confident_model_prediction_wins() {
        let svc = TicketService::new(
            Some(Arc::new(FixedClassifier {
                label: "Login Problem",
                score: 0.93,
            })),
            0.7,
        );

        // Keywords alone would say Software Bug; the confident model overrides.
        let analysis = svc.analyze("app error after entering password").await;
        assert_eq!(analysis.primary_tag, Tag::LoginProblem);
    }

    #[tokio::test]
    async fn test_low_confidence_falls_back_to_keywords() {
        let svc = TicketService::new(
            Some(Arc::new(FixedClassifier {
                label: "Feature Request",
                score: 0.42,
            })),
            0.7,
        );

        let analysis = svc.analyze("the invoice shows a duplicate charge").await;
        assert_eq!(analysis.primary_tag, Tag::PaymentIssue);
    }

    #[tokio::test]
    async fn test_threshold_is_strict() {
        let svc = TicketService::new(
            Some(Arc::new(FixedClassifier {
                label: "Software Bug",
                score: 0.7,
            })),
            0.7,
        );

        // Exactly at the threshold does not count as confident; the keyword
        // fallback decides instead.
        let analysis = svc.analyze("spreadsheet rows deleted and lost").await;
        assert_eq!(analysis.primary_tag, Tag::DataProblem);
    }

    #[tokio::test]
    async fn test_classifier_error_degrades_to_general() {
        let svc = TicketService::new(Some(Arc::new(FailingClassifier)), 0.7);

        let analysis = svc.analyze("urgent crash in the payment flow").await;
        assert_eq!(analysis.primary_tag, Tag::General);
        assert!(analysis.urgent);
        assert_eq!(analysis.solutions, Tag::General.solutions());
    }

    #[tokio::test]
    async fn test_untracked_tag_gets_general_checklist() {
        let svc = TicketService::new(
            Some(Arc::new(FixedClassifier {
                label: "Feature Request",
                score: 0.95,
            })),
            0.7,
        );

        let analysis = svc.analyze("can you add dark mode").await;
        assert_eq!(analysis.primary_tag, Tag::FeatureRequest);
        assert_eq!(analysis.solutions, Tag::General.solutions());
    }
}
