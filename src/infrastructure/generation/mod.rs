//! Generation providers backed by remote language models.

mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleProvider;
