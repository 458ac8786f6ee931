//! Infrastructure layer wiring concrete adapters (embeddings, index, knowledge, providers).

pub mod embeddings;
pub mod generation;
pub mod index;
pub mod knowledge;

#[cfg(feature = "fastembed-engine")]
pub use embeddings::FastEmbedEngine;
pub use embeddings::SimpleEmbedEngine;
pub use generation::OpenAiCompatibleProvider;
pub use index::InMemoryIndex;
pub use knowledge::KnowledgeStore;
