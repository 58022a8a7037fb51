use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Keywords that mark a ticket as urgent when found in the normalized text.
pub const URGENCY_KEYWORDS: [&str; 4] = ["urgent", "immediately", "critical", "emergency"];

/// Closed ticket-category vocabulary. Declaration order matters: keyword-score
/// ties resolve to the earliest declared candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    SoftwareBug,
    PerformanceIssue,
    LoginProblem,
    PaymentIssue,
    DataProblem,
    FeatureRequest,
    General,
}

impl Tag {
    /// Candidate labels scored by the classifier and the keyword fallback.
    /// `General` is the degraded default, never a candidate.
    pub const CANDIDATES: [Tag; 6] = [
        Tag::SoftwareBug,
        Tag::PerformanceIssue,
        Tag::LoginProblem,
        Tag::PaymentIssue,
        Tag::DataProblem,
        Tag::FeatureRequest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tag::SoftwareBug => "Software Bug",
            Tag::PerformanceIssue => "Performance Issue",
            Tag::LoginProblem => "Login Problem",
            Tag::PaymentIssue => "Payment Issue",
            Tag::DataProblem => "Data Problem",
            Tag::FeatureRequest => "Feature Request",
            Tag::General => "General",
        }
    }

    pub fn from_label(label: &str) -> Option<Tag> {
        Self::CANDIDATES
            .into_iter()
            .chain(std::iter::once(Tag::General))
            .find(|t| t.label() == label)
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Tag::SoftwareBug => &["crash", "error", "not working", "bug", "freeze"],
            Tag::PerformanceIssue => &["slow", "lag", "unresponsive", "timeout"],
            Tag::LoginProblem => &["can't log in", "login failed", "password", "authentication"],
            Tag::PaymentIssue => &["charge", "payment", "invoice", "refund", "$"],
            Tag::DataProblem => &["missing data", "deleted", "lost", "corrupted"],
            Tag::FeatureRequest => &["how to", "can you add", "feature request"],
            Tag::General => &[],
        }
    }

    /// Ordered remediation checklist. Tags without a dedicated checklist fall
    /// back to the general one.
    pub fn solutions(&self) -> &'static [&'static str] {
        match self {
            Tag::SoftwareBug => &[
                "1. Restart the application",
                "2. Check for updates",
                "3. Clear cache/data",
                "4. Collect error logs",
                "5. Escalate to engineering team",
            ],
            Tag::PerformanceIssue => &[
                "1. Check internet connection",
                "2. Try during non-peak hours",
                "3. Disable browser extensions",
            ],
            Tag::LoginProblem => &[
                "1. Reset password",
                "2. Check account status",
                "3. Verify email/phone",
            ],
            Tag::PaymentIssue => &[
                "1. Verify transaction ID",
                "2. Check payment processor",
                "3. Process refund if needed",
            ],
            Tag::DataProblem | Tag::FeatureRequest | Tag::General => &[
                "1. Acknowledge ticket receipt",
                "2. Gather more details",
                "3. Route to appropriate team",
            ],
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of analyzing a single ticket. Recomputed per request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketAnalysis {
    pub primary_tag: Tag,
    pub solutions: Vec<String>,
    pub urgent: bool,
}

impl TicketAnalysis {
    pub fn new(primary_tag: Tag, urgent: bool) -> Self {
        Self {
            primary_tag,
            solutions: primary_tag.solutions().iter().map(|s| s.to_string()).collect(),
            urgent,
        }
    }
}

fn strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Brace-delimited spans (templating noise in tickets) drop entirely;
    // every other non-word character becomes a space.
    PATTERN.get_or_init(|| Regex::new(r"\{.*?\}|[^\w\s]").expect("valid pattern"))
}

/// Lowercases ticket text and strips punctuation and `{...}` spans.
/// Keyword matching and urgency detection operate on this form only.
pub fn normalize_ticket_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    strip_pattern().replace_all(&lowered, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize_ticket_text("URGENT: payment refund not processed, $50 charged twice"),
            "urgent  payment refund not processed   50 charged twice"
        );
    }

    #[test]
    fn test_normalize_drops_brace_spans() {
        let out = normalize_ticket_text("error {trace_id: 123} in checkout");
        assert!(!out.contains("trace_id"));
        assert!(out.contains("error"));
        assert!(out.contains("checkout"));
    }

    #[test]
    fn test_candidate_order_is_stable() {
        assert_eq!(Tag::CANDIDATES[0], Tag::SoftwareBug);
        assert_eq!(Tag::CANDIDATES[3], Tag::PaymentIssue);
    }

    #[test]
    fn test_label_round_trip() {
        for tag in Tag::CANDIDATES {
            assert_eq!(Tag::from_label(tag.label()), Some(tag));
        }
        assert_eq!(Tag::from_label("General"), Some(Tag::General));
        assert_eq!(Tag::from_label("Unknown Category"), None);
    }

    #[test]
    fn test_untracked_tags_use_general_checklist() {
        assert_eq!(Tag::DataProblem.solutions(), Tag::General.solutions());
        assert_eq!(Tag::FeatureRequest.solutions(), Tag::General.solutions());
    }
}
