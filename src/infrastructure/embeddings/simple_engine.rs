use ahash::AHasher;
use std::hash::{Hash, Hasher};

use crate::{application::services::EmbeddingEngine, domain::DomainError};

/// Dimension used when no explicit size is configured.
pub const DEFAULT_SIMPLE_DIMENSIONS: usize = 384;

/// A lightweight, deterministic embedding engine that hashes tokens into a fixed-size vector.
/// This is not meant for production-grade semantic search, but it keeps retrieval functional
/// without downloading external models or shipping native dependencies.
pub struct SimpleEmbedEngine {
    model_name: String,
    dimensions: usize,
}

impl SimpleEmbedEngine {
    pub fn try_new(model_name: impl Into<String>, dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::validation(
                "embedding dimensions must be greater than zero",
            ));
        }
        let dims = dimensions.clamp(8, 4096);
        Ok(Self {
            model_name: model_name.into(),
            dimensions: dims,
        })
    }

    /// Engine with the default model label and the requested dimension.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            model_name: default_model_name(),
            dimensions: dimensions.clamp(8, 4096),
        }
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '-'))
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
    }

    fn hash_token(token: &str) -> usize {
        let mut hasher = AHasher::default();
        token.hash(&mut hasher);
        hasher.finish() as usize
    }

    fn embed_internal(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in Self::tokenize(text) {
            let idx = Self::hash_token(&token) % self.dimensions;
            vector[idx] += 1.0;
        }
        vector
    }
}

impl Default for SimpleEmbedEngine {
    fn default() -> Self {
        Self::with_dimensions(DEFAULT_SIMPLE_DIMENSIONS)
    }
}

impl EmbeddingEngine for SimpleEmbedEngine {
    fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::validation("text payload cannot be empty"));
        }
        Ok(self.embed_internal(text))
    }

    fn dims(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    fn model(&self) -> &str {
        &self.model_name
    }
}

pub(crate) fn default_model_name() -> String {
    "docsmith/simple-hash".to_string()
}
