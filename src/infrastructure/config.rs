use serde::Deserialize;
use std::path::Path;

/// Runtime configuration, YAML-loaded with compiled-in defaults and a handful
/// of environment overrides for deployment-specific values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub classifier: ClassifierConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
    pub worker: WorkerConfig,
    pub redis_url: String,
    pub qdrant_url: String,
    pub collection: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub max_tokens: u64,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-3-opus-20240229".to_string(),
            max_tokens: 500,
            temperature: 0.3,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
    pub confidence_threshold: f32,
    pub timeout_seconds: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model: "typeform/distilbert-base-uncased-mnli".to_string(),
            confidence_threshold: 0.7,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub temp_dir: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            temp_dir: "temp_uploads".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub concurrency: usize,
    pub result_ttl_seconds: u64,
    pub conversation_ttl_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            result_ttl_seconds: 3600,
            conversation_ttl_seconds: 86400,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            rag: RagConfig::default(),
            classifier: ClassifierConfig::default(),
            upload: UploadConfig::default(),
            cors: CorsConfig::default(),
            worker: WorkerConfig::default(),
            redis_url: "redis://localhost:6379".to_string(),
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "knowledge_base".to_string(),
            api_key: None,
        }
    }
}

/// Prompt texts kept out of code so operators can tune wording without a
/// rebuild.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PromptsConfig {
    pub agent: AgentPrompts,
    pub rag: RagPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub template: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            template: "Context: {context}\nQuestion: {question}\nProvide a professional, well-structured answer:".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Loads config and prompts from `CONFIG_PATH` / `PROMPTS_PATH` (defaults
    /// `config/default.yaml` and `config/prompts.yaml`), falling back to
    /// compiled-in defaults when a file is absent, then applies environment
    /// overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.yaml".into());
        let prompts_path =
            std::env::var("PROMPTS_PATH").unwrap_or_else(|_| "config/prompts.yaml".into());

        let mut config: Config = load_yaml(&config_path)?.unwrap_or_default();
        let prompts: PromptsConfig = load_yaml(&prompts_path)?.unwrap_or_default();

        if let Ok(url) = std::env::var("REDIS_URL") {
            config.redis_url = url;
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            config.qdrant_url = url;
        }
        if let Ok(key) = std::env::var("API_KEY") {
            config.api_key = Some(key);
        }

        Ok(Self { config, prompts })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: Config::default(),
            prompts: PromptsConfig::default(),
        }
    }
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<Option<T>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(Some(serde_yaml::from_str(&raw)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_generation_policy() {
        let config = Config::default();
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.llm.timeout_seconds, 30);
        assert_eq!(config.rag.top_k, 3);
        assert_eq!(config.classifier.confidence_threshold, 0.7);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("rag:\n  top_k: 5\n").unwrap();
        assert_eq!(config.rag.top_k, 5);
        assert_eq!(config.rag.chunk_size, 1000);
        assert_eq!(config.llm.max_tokens, 500);
    }

    #[test]
    fn test_default_prompt_template() {
        let prompts = PromptsConfig::default();
        assert_eq!(
            prompts.rag.template,
            "Context: {context}\nQuestion: {question}\nProvide a professional, well-structured answer:"
        );
    }
}
