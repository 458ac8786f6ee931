use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::application::services::ServiceConfig;

/// Default filename used to persist configuration within the data directory.
const CONFIG_FILENAME: &str = "config.json";

/// Environment variable read for the provider key unless configured otherwise.
pub const DEFAULT_API_KEY_ENV: &str = "DOCSMITH_API_KEY";

/// Declarative list of embedding backends compiled into the binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "kebab-case")]
pub enum EmbeddingBackend {
    /// Lightweight deterministic hash embedder (always available).
    Simple {
        #[serde(default = "default_simple_model")]
        model: String,
        #[serde(default = "default_simple_dim")]
        dimensions: usize,
    },
    /// No embedder; search scores by keyword overlap.
    Keyword,
    /// High-quality semantic embeddings powered by FastEmbed (feature gated).
    #[cfg(feature = "fastembed-engine")]
    FastEmbed { model: String },
}

impl EmbeddingBackend {
    pub fn id(&self) -> &'static str {
        match self {
            EmbeddingBackend::Simple { .. } => "simple",
            EmbeddingBackend::Keyword => "keyword",
            #[cfg(feature = "fastembed-engine")]
            EmbeddingBackend::FastEmbed { .. } => "fastembed",
        }
    }

    pub fn with_default_model(id: &str) -> Option<Self> {
        match id {
            "simple" => Some(EmbeddingBackend::Simple {
                model: default_simple_model(),
                dimensions: default_simple_dim(),
            }),
            "keyword" => Some(EmbeddingBackend::Keyword),
            #[cfg(feature = "fastembed-engine")]
            "fastembed" => Some(EmbeddingBackend::FastEmbed {
                model: default_fastembed_model(),
            }),
            _ => None,
        }
    }
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        #[cfg(feature = "fastembed-engine")]
        {
            EmbeddingBackend::FastEmbed {
                model: default_fastembed_model(),
            }
        }
        #[cfg(not(feature = "fastembed-engine"))]
        {
            EmbeddingBackend::Simple {
                model: default_simple_model(),
                dimensions: default_simple_dim(),
            }
        }
    }
}

/// Generation backend chosen explicitly; never inferred from the key's shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "provider", rename_all = "kebab-case")]
pub enum GenerationBackend {
    OpenaiCompatible {
        base_url: String,
        standard_model: String,
        expert_model: String,
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
    },
}

impl GenerationBackend {
    pub fn id(&self) -> &'static str {
        match self {
            GenerationBackend::OpenaiCompatible { .. } => "openai-compatible",
        }
    }

    /// Reads the key from the configured environment variable, if set.
    pub fn api_key(&self) -> Option<String> {
        match self {
            GenerationBackend::OpenaiCompatible { api_key_env, .. } => {
                std::env::var(api_key_env).ok()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetrievalSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            relevance_threshold: default_relevance_threshold(),
        }
    }
}

/// Complete persisted configuration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub embedding: EmbeddingBackend,
    #[serde(default)]
    pub generation: Option<GenerationBackend>,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,
    /// JSON knowledge table replacing the built-in one.
    #[serde(default)]
    pub knowledge_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingBackend::default(),
            generation: None,
            retrieval: RetrievalSettings::default(),
            generation_timeout_ms: default_generation_timeout_ms(),
            knowledge_path: None,
        }
    }
}

impl AppConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms.max(1))
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            top_k: self.retrieval.top_k.max(1),
            relevance_threshold: self.retrieval.relevance_threshold,
            generation_timeout: self.generation_timeout(),
        }
    }
}

/// Thread-safe manager responsible for loading and persisting `AppConfig`.
pub struct ConfigManager {
    path: PathBuf,
    state: RwLock<AppConfig>,
}

impl ConfigManager {
    /// Create a manager rooted at `data_dir`. The JSON file will be located at
    /// `<data_dir>/config.json`. A missing or unreadable file yields defaults.
    pub fn load(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(CONFIG_FILENAME);
        let config = fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<AppConfig>(&bytes).ok())
            .unwrap_or_default();

        Self {
            path,
            state: RwLock::new(config),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current configuration.
    pub fn current(&self) -> AppConfig {
        self.state.read().clone()
    }

    /// Update the active embedding backend and persist to disk.
    pub fn set_backend(&self, backend: EmbeddingBackend) -> std::io::Result<AppConfig> {
        self.update(|config| config.embedding = backend)
    }

    /// Replace (or clear) the generation backend and persist to disk.
    pub fn set_generation(
        &self,
        backend: Option<GenerationBackend>,
    ) -> std::io::Result<AppConfig> {
        self.update(|config| config.generation = backend)
    }

    fn update(&self, apply: impl FnOnce(&mut AppConfig)) -> std::io::Result<AppConfig> {
        let mut guard = self.state.write();
        apply(&mut guard);
        self.persist_locked(&guard)?;
        Ok(guard.clone())
    }

    /// Ensure the backing directory exists and write the JSON payload.
    fn persist_locked(&self, config: &AppConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(config)?;
        fs::write(&self.path, payload)
    }
}

pub fn available_backends() -> Vec<EmbeddingBackend> {
    let mut backends = Vec::new();
    #[cfg(feature = "fastembed-engine")]
    backends.push(EmbeddingBackend::FastEmbed {
        model: default_fastembed_model(),
    });
    backends.push(EmbeddingBackend::Simple {
        model: default_simple_model(),
        dimensions: default_simple_dim(),
    });
    backends.push(EmbeddingBackend::Keyword);
    backends
}

const fn default_simple_dim() -> usize {
    crate::infrastructure::embeddings::DEFAULT_SIMPLE_DIMENSIONS
}

fn default_simple_model() -> String {
    crate::infrastructure::embeddings::simple_engine::default_model_name()
}

#[cfg(feature = "fastembed-engine")]
fn default_fastembed_model() -> String {
    crate::infrastructure::embeddings::DEFAULT_FASTEMBED_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

const fn default_top_k() -> usize {
    crate::application::services::retriever::DEFAULT_TOP_K
}

const fn default_relevance_threshold() -> f32 {
    crate::application::services::retriever::DEFAULT_RELEVANCE_THRESHOLD
}

const fn default_generation_timeout_ms() -> u64 {
    30_000
}
