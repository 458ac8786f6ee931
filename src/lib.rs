use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod settings;

use application::services::{
    EmbeddingEngine, GenerationProvider, GenerationService, VectorIndex,
};
#[cfg(feature = "fastembed-engine")]
use infrastructure::FastEmbedEngine;
use infrastructure::{InMemoryIndex, KnowledgeStore, OpenAiCompatibleProvider, SimpleEmbedEngine};
use settings::{AppConfig, ConfigManager, EmbeddingBackend, GenerationBackend};

/// Environment variable overriding the OS data directory.
pub const DATA_DIR_ENV: &str = "DOCSMITH_DATA_DIR";

/// Everything a host process needs after bootstrap.
pub struct AppHandles {
    pub service: Arc<GenerationService>,
    pub knowledge: Arc<KnowledgeStore>,
    pub index: Arc<dyn VectorIndex>,
    pub config: Arc<ConfigManager>,
    pub data_dir: PathBuf,
}

/// Installs the global fmt subscriber once. Filter comes from `DOCSMITH_LOG`.
pub fn init_tracing() {
    init_tracing_with_writer(std::io::stderr);
}

fn init_tracing_with_writer<W>(make_writer: fn() -> W)
where
    W: std::io::Write + Send + Sync + 'static,
{
    static INIT: std::sync::OnceLock<()> = std::sync::OnceLock::new();

    let _ = INIT.get_or_init(|| {
        let filter = std::env::var("DOCSMITH_LOG").unwrap_or_else(|_| "info".into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(make_writer)
            .compact()
            .try_init();
    });
}

/// Bootstraps the service from the configuration stored in the data directory.
pub fn build_environment() -> Result<AppHandles> {
    let data_dir = resolve_data_dir()?;
    build_environment_in(data_dir)
}

/// Same as [`build_environment`] with an explicit data directory.
pub fn build_environment_in(data_dir: impl Into<PathBuf>) -> Result<AppHandles> {
    let data_dir = data_dir.into();
    std::fs::create_dir_all(&data_dir).context("failed to create data directory")?;

    let config = Arc::new(ConfigManager::load(&data_dir));
    let active = config.current();

    let knowledge = Arc::new(
        init_knowledge(&active, &data_dir).context("failed to load knowledge table")?,
    );
    let index: Arc<dyn VectorIndex> = Arc::new(
        init_index(&active.embedding, &knowledge).context("failed to build knowledge index")?,
    );
    let provider = init_provider(active.generation.as_ref(), active.generation_timeout());

    let service = Arc::new(GenerationService::new(
        Arc::clone(&knowledge),
        Arc::clone(&index),
        provider,
        active.service_config(),
    ));

    info!(
        target: "docsmith",
        data_dir = %data_dir.display(),
        embedding = active.embedding.id(),
        generation = active.generation.as_ref().map(GenerationBackend::id),
        documents = index.len(),
        "environment ready"
    );

    Ok(AppHandles {
        service,
        knowledge,
        index,
        config,
        data_dir,
    })
}

fn init_knowledge(config: &AppConfig, data_dir: &Path) -> Result<KnowledgeStore> {
    match &config.knowledge_path {
        Some(path) => {
            let path = if path.is_relative() {
                data_dir.join(path)
            } else {
                path.clone()
            };
            KnowledgeStore::from_json_file(&path).map_err(|err| anyhow!(err.to_string()))
        }
        None => Ok(KnowledgeStore::builtin()),
    }
}

/// Builds the index for `backend` and seeds it with every knowledge document.
pub fn init_index(backend: &EmbeddingBackend, knowledge: &KnowledgeStore) -> Result<InMemoryIndex> {
    let mut index = match init_embedder(backend)? {
        Some(engine) => InMemoryIndex::with_engine(engine),
        None => InMemoryIndex::keyword_overlap(),
    };
    knowledge
        .seed_index(&mut index)
        .map_err(|err| anyhow!(err.to_string()))?;
    Ok(index)
}

fn init_embedder(backend: &EmbeddingBackend) -> Result<Option<Arc<dyn EmbeddingEngine>>> {
    match backend {
        EmbeddingBackend::Simple { model, dimensions } => {
            let engine: Arc<dyn EmbeddingEngine> = Arc::new(
                SimpleEmbedEngine::try_new(model.clone(), *dimensions)
                    .map_err(|err| anyhow!(err.to_string()))?,
            );
            Ok(Some(engine))
        }
        EmbeddingBackend::Keyword => Ok(None),
        #[cfg(feature = "fastembed-engine")]
        EmbeddingBackend::FastEmbed { model } => {
            let engine: Arc<dyn EmbeddingEngine> = Arc::new(
                FastEmbedEngine::try_new(model).map_err(|err| anyhow!(err.to_string()))?,
            );
            Ok(Some(engine))
        }
    }
}

fn init_provider(
    backend: Option<&GenerationBackend>,
    timeout: std::time::Duration,
) -> Option<Arc<dyn GenerationProvider>> {
    let backend = backend?;
    let provider: Arc<dyn GenerationProvider> = match backend {
        GenerationBackend::OpenaiCompatible {
            base_url,
            standard_model,
            expert_model,
            ..
        } => Arc::new(OpenAiCompatibleProvider::new(
            base_url.clone(),
            standard_model.clone(),
            expert_model.clone(),
            backend.api_key(),
            timeout,
        )),
    };
    Some(provider)
}

fn resolve_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let dirs = directories::ProjectDirs::from("dev", "docsmith", "Docsmith")
        .ok_or_else(|| anyhow!("unable to determine OS data dir"))?;
    Ok(dirs.data_dir().to_path_buf())
}
