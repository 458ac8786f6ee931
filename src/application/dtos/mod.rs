use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    DocumentType, Domain, GenerationInputs, GenerationStrategy, KnowledgeKind, QualityReport,
    RetrievalContext,
};

/// Payload accepted from the HTTP layer when a document is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub project: String,
    pub inputs: GenerationInputs,
    pub doc_type: DocumentType,
    #[serde(default = "default_version")]
    pub version: u32,
}

impl GenerateRequest {
    pub fn new(project: impl Into<String>, inputs: GenerationInputs, doc_type: DocumentType) -> Self {
        Self {
            project: project.into(),
            inputs,
            doc_type,
            version: default_version(),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

/// How the returned content was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisPath {
    Provider,
    TemplateFallback,
    Emergency,
}

/// Why the provider output was not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoProvider,
    ProviderError,
    Timeout,
    MalformedOutput,
}

/// Condensed view of the retrieval context returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalSummary {
    pub domain: Domain,
    pub stakeholders: Vec<String>,
    pub compliance_requirements: Vec<String>,
    pub best_practices_count: usize,
    pub enrichment_count: usize,
}

impl From<&RetrievalContext> for RetrievalSummary {
    fn from(context: &RetrievalContext) -> Self {
        Self {
            domain: context.domain,
            stakeholders: context.stakeholders.clone(),
            compliance_requirements: context.compliance_requirements.clone(),
            best_practices_count: context.best_practices.len(),
            enrichment_count: context.enrichment_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub request_id: Uuid,
    pub project: String,
    pub version: u32,
    pub document_type: DocumentType,
    pub domain: Domain,
    pub synthesis: SynthesisPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<GenerationStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityReport>,
    pub generation_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_summary: Option<RetrievalSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope returned for every generation request.
///
/// `success` reports whether the enhanced pipeline completed; `content` is
/// never empty either way.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    pub content: String,
    pub metadata: GenerationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchKnowledgeRequest {
    pub query: String,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Result row returned from knowledge search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeHit {
    pub text: String,
    pub content: String,
    pub kind: KnowledgeKind,
    pub domain: Domain,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSearchResponse {
    pub query: String,
    pub results: Vec<KnowledgeHit>,
}

/// Readiness report for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub ok: bool,
    pub scoring: String,
    pub generation_provider: Option<String>,
    pub indexed_documents: usize,
    pub supported_domains: Vec<Domain>,
    pub checked_at: DateTime<Utc>,
}

const fn default_version() -> u32 {
    1
}

const fn default_limit() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_with_default_version() {
        let request: GenerateRequest = serde_json::from_str(
            r#"{"project":"Atlas","inputs":{"goal":"ship"},"docType":"BRD"}"#,
        )
        .unwrap();
        assert_eq!(request.version, 1);
        assert_eq!(request.doc_type, DocumentType::Brd);
    }

    #[test]
    fn search_request_defaults() {
        let request: SearchKnowledgeRequest =
            serde_json::from_str(r#"{"query":"fraud","domain":"cards_payment"}"#).unwrap();
        assert_eq!(request.limit, 5);
        assert_eq!(request.domain, Some(Domain::CardsPayment));
    }
}
