use std::str::FromStr;

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use parking_lot::Mutex;

use crate::{application::services::EmbeddingEngine, domain::DomainError};

pub const DEFAULT_FASTEMBED_MODEL: &str = "BAAI/bge-small-en-v1.5";

/// Semantic embeddings for the knowledge index, backed by one loaded ONNX model.
pub struct FastEmbedEngine {
    model: String,
    dimensions: usize,
    inner: Mutex<TextEmbedding>,
}

impl FastEmbedEngine {
    pub fn try_new(model: impl AsRef<str>) -> Result<Self, DomainError> {
        let model = model.as_ref().trim();
        let parsed = EmbeddingModel::from_str(model).map_err(|err| {
            DomainError::configuration(format!("unknown fastembed model `{model}`: {err}"))
        })?;
        let dimensions = TextEmbedding::get_model_info(&parsed)
            .map_err(|err| DomainError::embedding_unavailable(err.to_string()))?
            .dim;
        let inner = TextEmbedding::try_new(TextInitOptions::new(parsed)).map_err(|err| {
            DomainError::embedding_unavailable(format!("cannot load `{model}`: {err}"))
        })?;

        Ok(Self {
            model: model.to_string(),
            dimensions,
            inner: Mutex::new(inner),
        })
    }
}

impl EmbeddingEngine for FastEmbedEngine {
    fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        // The index normalises and falls back per text, so only shape is checked here.
        self.inner
            .lock()
            .embed(vec![text], None)
            .map_err(|err| DomainError::embedding(err.to_string()))?
            .into_iter()
            .next()
            .filter(|vector| vector.len() == self.dimensions)
            .ok_or_else(|| DomainError::embedding("fastembed returned no usable vector"))
    }

    fn dims(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
