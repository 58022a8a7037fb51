use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

use crate::application::services::RagService;
use crate::domain::{ports::LlmService, DomainError, Message};

/// A generated answer plus the provenance metadata shown to the user.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub text: String,
    pub elapsed: Duration,
    pub sources: usize,
}

impl RagAnswer {
    /// Display form: the answer followed by generation time and source count.
    pub fn formatted(&self) -> String {
        format!(
            "{}\n\nGenerated in {:.2}s | Sources: {} documents referenced",
            self.text,
            self.elapsed.as_secs_f64(),
            self.sources
        )
    }
}

/// The retrieval-augmented query path: embed the question, retrieve the
/// nearest chunks, condition the model on them, and report elapsed time and
/// how many chunks informed the answer. Any failure along the way surfaces as
/// a single error for the caller to display; there is no retry and no partial
/// result.
pub struct AnswerService {
    rag: Arc<RagService>,
    llm: Arc<dyn LlmService>,
    top_k: usize,
    template: String,
    system: String,
}

impl AnswerService {
    pub const DEFAULT_TEMPLATE: &'static str =
        "Context: {context}\nQuestion: {question}\nProvide a professional, well-structured answer:";

    pub fn new(rag: Arc<RagService>, llm: Arc<dyn LlmService>, top_k: usize) -> Self {
        Self {
            rag,
            llm,
            top_k,
            template: Self::DEFAULT_TEMPLATE.to_string(),
            system: String::new(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    #[instrument(skip(self, history), fields(history_len = history.len()))]
    pub async fn answer(
        &self,
        query: &str,
        history: &[Message],
    ) -> Result<RagAnswer, DomainError> {
        let start = Instant::now();

        let results = self.rag.retrieve_top_k(query, self.top_k).await?;
        let context = results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let question = build_question(query, history);
        let prompt = self
            .template
            .replace("{context}", &context)
            .replace("{question}", &question);

        let text = if self.system.is_empty() {
            self.llm.complete(&prompt).await?
        } else {
            self.llm.complete_with_system(&self.system, &prompt).await?
        };

        Ok(RagAnswer {
            text,
            elapsed: start.elapsed(),
            sources: results.len(),
        })
    }
}

fn build_question(query: &str, history: &[Message]) -> String {
    if history.is_empty() {
        return query.to_string();
    }

    let context = history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Previous conversation:\n{}\n\nCurrent message from user: {}",
        context, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::EmbeddingService;
    use crate::domain::{DocumentChunk, Embedding, MessageRole};
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::sync::Mutex;
    use uuid::Uuid;

    const DIM: usize = 64;

    /// Deterministic bag-of-words embedding: close enough to a real model for
    /// exercising nearest-neighbor retrieval without network access.
    struct HashEmbedding;

    fn embed_words(text: &str) -> Embedding {
        let mut vec = vec![0.0f32; DIM];
        for word in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            vec[(hasher.finish() as usize) % DIM] += 1.0;
        }
        Embedding::new(vec)
    }

    #[async_trait]
    impl EmbeddingService for HashEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            Ok(embed_words(text))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Ok(texts.iter().map(|t| embed_words(t)).collect())
        }

        fn dimension(&self) -> usize {
            DIM
        }
    }

    /// Records the prompt it was given and replies with a canned answer.
    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingLlm {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmService for RecordingLlm {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("canned answer".to_string())
        }

        async fn complete_with_system(
            &self,
            _system: &str,
            prompt: &str,
        ) -> Result<String, DomainError> {
            self.complete(prompt).await
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmService for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, DomainError> {
            Err(DomainError::external("model endpoint unreachable"))
        }

        async fn complete_with_system(
            &self,
            _system: &str,
            _prompt: &str,
        ) -> Result<String, DomainError> {
            Err(DomainError::external("model endpoint unreachable"))
        }
    }

    async fn indexed_rag(chunks: &[&str]) -> Arc<RagService> {
        let rag = Arc::new(RagService::new(
            Arc::new(HashEmbedding),
            Arc::new(InMemoryVectorStore::new()),
            3,
        ));
        let doc_id = Uuid::new_v4();
        let chunks: Vec<DocumentChunk> = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| DocumentChunk::new(doc_id, *c, i))
            .collect();
        rag.index_chunks(&chunks).await.unwrap();
        rag
    }

    #[tokio::test]
    async fn test_answer_builds_context_prompt() {
        let rag = indexed_rag(&["the warranty covers two years"]).await;
        let llm = Arc::new(RecordingLlm::new());
        let svc = AnswerService::new(rag, llm.clone(), 3);

        let answer = svc.answer("how long is the warranty", &[]).await.unwrap();

        assert_eq!(answer.text, "canned answer");
        assert_eq!(answer.sources, 1);

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(
            prompts[0],
            "Context: the warranty covers two years\n\
             Question: how long is the warranty\n\
             Provide a professional, well-structured answer:"
        );
    }

    #[tokio::test]
    async fn test_round_trip_retrieves_verbatim_phrase() {
        let rag = indexed_rag(&[
            "billing cycles renew on the first business day of each month",
            "the dashboard shows realtime usage graphs per project",
            "support tickets are triaged within four working hours",
        ])
        .await;
        let llm = Arc::new(RecordingLlm::new());
        let svc = AnswerService::new(rag, llm.clone(), 3);

        svc.answer("when are support tickets triaged", &[])
            .await
            .unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("support tickets are triaged within four working hours"));
    }

    #[tokio::test]
    async fn test_answer_reports_source_count_and_elapsed() {
        let rag = indexed_rag(&["alpha beta", "gamma delta", "epsilon zeta", "eta theta"]).await;
        let svc = AnswerService::new(rag, Arc::new(RecordingLlm::new()), 3);

        let answer = svc.answer("alpha", &[]).await.unwrap();

        assert_eq!(answer.sources, 3);
        let formatted = answer.formatted();
        assert!(formatted.starts_with("canned answer\n\nGenerated in "));
        assert!(formatted.ends_with("| Sources: 3 documents referenced"));
    }

    #[tokio::test]
    async fn test_history_is_prefixed_to_question() {
        let rag = indexed_rag(&["refund policy lasts thirty days"]).await;
        let llm = Arc::new(RecordingLlm::new());
        let svc = AnswerService::new(rag, llm.clone(), 3);

        let history = vec![
            Message::new(MessageRole::User, "do you offer refunds"),
            Message::new(MessageRole::Assistant, "yes, within the policy window"),
        ];
        svc.answer("how long is the window", &history).await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Previous conversation:"));
        assert!(prompts[0].contains("User: do you offer refunds"));
        assert!(prompts[0].contains("Current message from user: how long is the window"));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let rag = indexed_rag(&["some context"]).await;
        let svc = AnswerService::new(rag, Arc::new(FailingLlm), 3);

        let err = svc.answer("anything", &[]).await.unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(_)));
    }
}
