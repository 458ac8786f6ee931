//! Application layer wiring DTOs and services for docsmith.

pub mod dtos;
pub mod services;

pub use dtos::{
    FallbackReason, GenerateRequest, GenerationMetadata, GenerationResult, KnowledgeHit,
    KnowledgeSearchResponse, RetrievalSummary, SearchKnowledgeRequest, ServiceStatus,
    SynthesisPath,
};
pub use services::GenerationService;
