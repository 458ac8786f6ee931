use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::{
    evaluator::QualityEvaluator,
    planner::StrategyPlanner,
    retriever::{ContextRetriever, DEFAULT_RELEVANCE_THRESHOLD, DEFAULT_TOP_K},
    synthesizer::{ContentSynthesizer, DEFAULT_GENERATION_TIMEOUT},
};
use crate::{
    application::dtos::{
        GenerateRequest, GenerationMetadata, GenerationResult, KnowledgeHit,
        KnowledgeSearchResponse, RetrievalSummary, SearchKnowledgeRequest, ServiceStatus,
        SynthesisPath,
    },
    domain::{
        input_text, models::MAX_INPUTS, DocumentMetadata, DocumentType, Domain, DomainError,
        GenerationInputs, InputValue, QueryFilters,
    },
    infrastructure::knowledge::KnowledgeStore,
};

const MAX_INPUT_CHARS: usize = 100_000;
const MAX_SEARCH_LIMIT: usize = 50;

/// Tuning shared by the service and its stages.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub top_k: usize,
    pub relevance_threshold: f32,
    pub generation_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

/// Abstraction over any embedding engine (FastEmbed, hashing, remote, etc).
pub trait EmbeddingEngine: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    fn dims(&self) -> Option<usize> {
        None
    }

    fn model(&self) -> &str;
}

/// One nearest-neighbour match with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub metadata: DocumentMetadata,
    pub score: f32,
}

/// Contract for the read-mostly knowledge index.
pub trait VectorIndex: Send + Sync {
    /// Up to `limit` hits matching `filters`, best first. Never errors on an empty index.
    fn search(
        &self,
        query: &str,
        limit: usize,
        filters: &QueryFilters,
    ) -> Result<Vec<SearchHit>, DomainError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short description of how results are scored.
    fn scoring(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Standard,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub model_tier: ModelTier,
}

/// Blocking text-completion backend. Called off the async runtime.
pub trait GenerationProvider: Send + Sync {
    fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String, DomainError>;

    fn name(&self) -> &str;
}

/// The orchestrator: classify, retrieve, plan, synthesize, evaluate.
pub struct GenerationService {
    knowledge: Arc<KnowledgeStore>,
    index: Arc<dyn VectorIndex>,
    retriever: ContextRetriever,
    planner: StrategyPlanner,
    synthesizer: ContentSynthesizer,
    evaluator: QualityEvaluator,
}

impl GenerationService {
    pub fn new(
        knowledge: Arc<KnowledgeStore>,
        index: Arc<dyn VectorIndex>,
        provider: Option<Arc<dyn GenerationProvider>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            retriever: ContextRetriever::new(knowledge.clone(), index.clone())
                .with_limits(config.top_k, config.relevance_threshold),
            planner: StrategyPlanner,
            synthesizer: ContentSynthesizer::new(provider, config.generation_timeout),
            evaluator: QualityEvaluator::new(knowledge.clone()),
            knowledge,
            index,
        }
    }

    pub fn retriever(&self) -> &ContextRetriever {
        &self.retriever
    }

    pub async fn generate(&self, request: GenerateRequest) -> GenerationResult {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        info!(
            target: "docsmith::service",
            %request_id,
            project = %request.project,
            doc_type = %request.doc_type,
            "generation requested"
        );

        match self.run(&request, request_id, started).await {
            Ok(result) => result,
            Err(err) => {
                error!(
                    target: "docsmith::service",
                    %request_id,
                    error = %err,
                    "pipeline failed; returning emergency document"
                );
                emergency_result(&request, request_id, started, &err)
            }
        }
    }

    /// Generates an FRD with the BRD text supplied as extra context.
    pub async fn generate_frd_from_brd(
        &self,
        project: impl Into<String>,
        mut inputs: GenerationInputs,
        brd_content: &str,
        version: u32,
    ) -> GenerationResult {
        if !brd_content.trim().is_empty() {
            inputs.insert(
                "brd_context".to_string(),
                InputValue::Text(brd_content.to_string()),
            );
        }
        let request = GenerateRequest::new(project, inputs, DocumentType::Frd).with_version(version);
        self.generate(request).await
    }

    pub fn search_knowledge(
        &self,
        request: SearchKnowledgeRequest,
    ) -> Result<KnowledgeSearchResponse, DomainError> {
        if request.query.trim().is_empty() {
            return Err(DomainError::validation("query cannot be empty"));
        }

        let filters = QueryFilters {
            domain: request.domain,
            kind: None,
        };
        let limit = request.limit.clamp(1, MAX_SEARCH_LIMIT);
        let results = self
            .index
            .search(request.query.trim(), limit, &filters)?
            .into_iter()
            .map(|hit| KnowledgeHit {
                text: hit.text,
                content: hit.metadata.content,
                kind: hit.metadata.kind,
                domain: hit.metadata.domain,
                score: hit.score,
            })
            .collect();

        Ok(KnowledgeSearchResponse {
            query: request.query,
            results,
        })
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            ok: true,
            scoring: self.index.scoring(),
            generation_provider: self.synthesizer.provider_name().map(str::to_string),
            indexed_documents: self.index.len(),
            supported_domains: self.knowledge.domains(),
            checked_at: Utc::now(),
        }
    }

    async fn run(
        &self,
        request: &GenerateRequest,
        request_id: Uuid,
        started: Instant,
    ) -> Result<GenerationResult, DomainError> {
        validate_request(request)?;
        let text = input_text(&request.inputs);

        let (context, strategy) = guarded("retrieval", || {
            let context = self.retriever.retrieve(&text, request.doc_type);
            let strategy = self.planner.plan(&text, &context);
            (context, strategy)
        })?;
        info!(
            target: "docsmith::service",
            %request_id,
            domain = %context.domain,
            enrichments = context.enrichment_count(),
            "context ready"
        );

        let synthesis = self
            .synthesizer
            .synthesize(&request.project, &request.inputs, &context, &strategy)
            .await;

        let quality = guarded("evaluation", || {
            self.evaluator.evaluate(&synthesis.body, &context)
        })?;
        info!(
            target: "docsmith::service",
            %request_id,
            path = ?synthesis.path,
            overall = quality.overall(),
            "document generated"
        );

        Ok(GenerationResult {
            success: true,
            content: synthesis.content(),
            metadata: GenerationMetadata {
                request_id,
                project: request.project.clone(),
                version: request.version,
                document_type: request.doc_type,
                domain: context.domain,
                synthesis: synthesis.path,
                fallback_reason: synthesis.fallback_reason,
                strategy: Some(strategy),
                quality: Some(quality),
                generation_time_ms: elapsed_ms(started),
                retrieval_summary: Some(RetrievalSummary::from(&context)),
                error: None,
            },
        })
    }
}

fn validate_request(request: &GenerateRequest) -> Result<(), DomainError> {
    if request.project.trim().is_empty() {
        return Err(DomainError::validation("project is required"));
    }
    if request.inputs.len() > MAX_INPUTS {
        return Err(DomainError::limit(format!(
            "inputs cannot exceed {MAX_INPUTS} entries"
        )));
    }
    let chars: usize = request.inputs.values().map(InputValue::char_count).sum();
    if chars > MAX_INPUT_CHARS {
        return Err(DomainError::limit(format!(
            "inputs cannot exceed {MAX_INPUT_CHARS} characters"
        )));
    }
    Ok(())
}

/// Runs a synchronous stage, turning a panic into an error.
fn guarded<T>(stage: &str, f: impl FnOnce() -> T) -> Result<T, DomainError> {
    catch_unwind(AssertUnwindSafe(f))
        .map_err(|_| DomainError::other(format!("{stage} stage panicked")))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Minimal document assembled straight from the raw request.
fn emergency_result(
    request: &GenerateRequest,
    request_id: Uuid,
    started: Instant,
    err: &DomainError,
) -> GenerationResult {
    let project = match request.project.trim() {
        "" => "Untitled project",
        name => name,
    };

    let mut content = format!(
        "# {}: {}\n\n**Version:** {}\n**Generated:** {}\n\n## Inputs\n",
        request.doc_type,
        project,
        request.version,
        Utc::now().to_rfc3339()
    );
    let lines: Vec<String> = request
        .inputs
        .iter()
        .filter(|(_, value)| !value.is_blank())
        .map(|(key, value)| format!("- **{key}**: {value}"))
        .collect();
    if lines.is_empty() {
        content.push_str("- No inputs supplied\n");
    } else {
        content.push_str(&lines.join("\n"));
        content.push('\n');
    }

    GenerationResult {
        success: false,
        content,
        metadata: GenerationMetadata {
            request_id,
            project: request.project.clone(),
            version: request.version,
            document_type: request.doc_type,
            domain: Domain::General,
            synthesis: SynthesisPath::Emergency,
            fallback_reason: None,
            strategy: None,
            quality: None,
            generation_time_ms: elapsed_ms(started),
            retrieval_summary: None,
            error: Some(err.to_string()),
        },
    }
}
