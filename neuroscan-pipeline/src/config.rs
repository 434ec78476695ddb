//! Pipeline configuration
//!
//! Defines the connection settings for every backing service (reasoning LLM,
//! classifier model server, treatment graph) and where reports are written.

use std::path::PathBuf;
use std::time::Duration;

/// Where treatment lookups are answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeBackend {
    /// Built-in tumor/treatment table
    Static,
    /// Neo4j treatment graph
    Neo4j,
}

impl std::str::FromStr for KnowledgeBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "neo4j" => Ok(Self::Neo4j),
            other => anyhow::bail!("unknown knowledge backend '{}' (expected static or neo4j)", other),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Ollama base URL (e.g., "http://localhost:11434")
    pub ollama_host: String,

    /// Model used by every reasoning agent
    pub ollama_model: String,

    /// Sampling temperature for agent turns
    pub temperature: f32,

    /// Maximum time a single agent turn may take
    pub llm_timeout: Duration,

    /// Model server base URL
    pub classifier_url: String,

    /// Name of the classifier model on the model server
    pub classifier_model: String,

    pub knowledge_backend: KnowledgeBackend,

    pub neo4j_url: String,
    pub neo4j_database: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    /// Directory exported reports are written to
    pub report_dir: PathBuf,
}

impl PipelineConfig {
    /// Creates configuration from environment variables
    ///
    /// Every variable is optional:
    /// - OLLAMA_HOST (default: http://localhost:11434)
    /// - OLLAMA_MODEL (default: mistral:latest)
    /// - LLM_TEMPERATURE (default: 0.1)
    /// - LLM_TIMEOUT (seconds, default: 300)
    /// - CLASSIFIER_URL (default: http://localhost:8501)
    /// - CLASSIFIER_MODEL (default: best_model_VGG19)
    /// - KNOWLEDGE_BACKEND (static | neo4j, default: static)
    /// - NEO4J_URL, NEO4J_DATABASE, NEO4J_USER, NEO4J_PASSWORD
    /// - REPORT_DIR (default: reports)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let temperature = match std::env::var("LLM_TEMPERATURE") {
            Ok(s) => s
                .parse::<f32>()
                .map_err(|_| anyhow::anyhow!("LLM_TEMPERATURE must be a number, got '{}'", s))?,
            Err(_) => defaults.temperature,
        };

        let llm_timeout = std::env::var("LLM_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.llm_timeout);

        let knowledge_backend = match std::env::var("KNOWLEDGE_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => defaults.knowledge_backend,
        };

        Ok(Self {
            ollama_host: env_or("OLLAMA_HOST", defaults.ollama_host),
            ollama_model: env_or("OLLAMA_MODEL", defaults.ollama_model),
            temperature,
            llm_timeout,
            classifier_url: env_or("CLASSIFIER_URL", defaults.classifier_url),
            classifier_model: env_or("CLASSIFIER_MODEL", defaults.classifier_model),
            knowledge_backend,
            neo4j_url: env_or("NEO4J_URL", defaults.neo4j_url),
            neo4j_database: env_or("NEO4J_DATABASE", defaults.neo4j_database),
            neo4j_user: env_or("NEO4J_USER", defaults.neo4j_user),
            neo4j_password: env_or("NEO4J_PASSWORD", defaults.neo4j_password),
            report_dir: std::env::var("REPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.report_dir),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("ollama_host", &self.ollama_host),
            ("classifier_url", &self.classifier_url),
            ("neo4j_url", &self.neo4j_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.ollama_model.is_empty() {
            anyhow::bail!("ollama_model cannot be empty");
        }

        if self.classifier_model.is_empty() {
            anyhow::bail!("classifier_model cannot be empty");
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!("temperature must be between 0 and 2");
        }

        if self.llm_timeout.as_secs() == 0 {
            anyhow::bail!("llm_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ollama_host: "http://localhost:11434".to_string(),
            ollama_model: "mistral:latest".to_string(),
            temperature: 0.1,
            llm_timeout: Duration::from_secs(300),
            classifier_url: "http://localhost:8501".to_string(),
            classifier_model: "best_model_VGG19".to_string(),
            knowledge_backend: KnowledgeBackend::Static,
            neo4j_url: "http://127.0.0.1:7474".to_string(),
            neo4j_database: "neo4j".to_string(),
            neo4j_user: "neo4j".to_string(),
            neo4j_password: String::new(),
            report_dir: PathBuf::from("reports"),
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.ollama_model, "mistral:latest");
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.llm_timeout, Duration::from_secs(300));
        assert_eq!(config.knowledge_backend, KnowledgeBackend::Static);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PipelineConfig::default();

        config.classifier_url = "localhost:8501".to_string();
        assert!(config.validate().is_err());
        config.classifier_url = "http://localhost:8501".to_string();

        config.temperature = 3.0;
        assert!(config.validate().is_err());
        config.temperature = 0.0;
        assert!(config.validate().is_ok());

        config.ollama_model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_knowledge_backend_parsing() {
        assert_eq!("Neo4j".parse::<KnowledgeBackend>().unwrap(), KnowledgeBackend::Neo4j);
        assert_eq!("static".parse::<KnowledgeBackend>().unwrap(), KnowledgeBackend::Static);
        assert!("sqlite".parse::<KnowledgeBackend>().is_err());
    }
}
