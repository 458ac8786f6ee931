//! Service layer: the generation pipeline stages and the orchestrator that sequences them.

pub mod classifier;
pub mod evaluator;
mod generation_service;
pub mod planner;
pub mod retriever;
pub mod synthesizer;

pub use classifier::DomainClassifier;
pub use evaluator::QualityEvaluator;
pub use generation_service::{
    CompletionParams, EmbeddingEngine, GenerationProvider, GenerationService, ModelTier,
    SearchHit, ServiceConfig, VectorIndex,
};
pub use planner::StrategyPlanner;
pub use retriever::ContextRetriever;
pub use synthesizer::{ContentSynthesizer, Synthesis};
