//! Domain layer: core business entities and value objects for docsmith.

pub mod errors;
pub mod models;

pub use errors::DomainError;
pub use models::{
    input_text, Complexity, ContextEntry, DocumentMetadata, DocumentType, Domain, DomainProfile,
    Enhancement, EntryOrigin, GenerationInputs, GenerationStrategy, InputValue, KnowledgeDocument,
    KnowledgeKind, QualityReport, QueryFilters, RetrievalContext, Strictness,
};
