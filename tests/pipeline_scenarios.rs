use std::sync::Arc;

use docsmith::application::services::synthesizer::template_document;
use docsmith::application::services::{
    CompletionParams, DomainClassifier, GenerationProvider, GenerationService, QualityEvaluator,
    ServiceConfig, StrategyPlanner, VectorIndex,
};
use docsmith::application::{FallbackReason, GenerateRequest, SynthesisPath};
use docsmith::domain::{
    input_text, DocumentType, Domain, DomainError, GenerationInputs, InputValue, KnowledgeDocument,
    KnowledgeKind, QueryFilters,
};
use docsmith::infrastructure::{InMemoryIndex, KnowledgeStore, SimpleEmbedEngine};

struct AlwaysFails;

impl GenerationProvider for AlwaysFails {
    fn complete(&self, _prompt: &str, _params: &CompletionParams) -> Result<String, DomainError> {
        Err(DomainError::generation("upstream unavailable"))
    }

    fn name(&self) -> &str {
        "always-fails"
    }
}

struct Rambler;

impl GenerationProvider for Rambler {
    fn complete(&self, _prompt: &str, _params: &CompletionParams) -> Result<String, DomainError> {
        Ok("Here are some thoughts about your idea. It sounds great!".to_string())
    }

    fn name(&self) -> &str {
        "rambler"
    }
}

fn knowledge() -> Arc<KnowledgeStore> {
    Arc::new(KnowledgeStore::builtin())
}

fn service_with(provider: Arc<dyn GenerationProvider>) -> GenerationService {
    let knowledge = knowledge();
    let mut index = InMemoryIndex::with_engine(Arc::new(SimpleEmbedEngine::default()));
    knowledge.seed_index(&mut index).unwrap();
    GenerationService::new(knowledge, Arc::new(index), Some(provider), ServiceConfig::default())
}

fn inputs(pairs: &[(&str, &str)]) -> GenerationInputs {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), InputValue::from(*value)))
        .collect()
}

#[test]
fn scenario_a_repeated_clinical_terms_classify_as_healthcare() {
    let classifier = DomainClassifier::new(knowledge());
    let text = "patient medical clinical ".repeat(3);
    assert_eq!(classifier.classify(&text), Domain::Healthcare);
}

#[tokio::test]
async fn scenario_b_failing_provider_still_succeeds() {
    let service = service_with(Arc::new(AlwaysFails));
    let request = GenerateRequest::new(
        "Orion Claims Portal",
        inputs(&[("description", "online portal for members")]),
        DocumentType::Brd,
    );

    let result = service.generate(request).await;
    assert!(result.success);
    assert!(!result.content.is_empty());
    assert!(result.content.contains("Orion Claims Portal"));
    assert!(result.content.contains("BRD"));
    assert_eq!(result.metadata.synthesis, SynthesisPath::TemplateFallback);
    assert_eq!(
        result.metadata.fallback_reason,
        Some(FallbackReason::ProviderError)
    );
}

#[tokio::test]
async fn scenario_c_unstructured_output_is_replaced_by_the_template() {
    let service = service_with(Arc::new(Rambler));
    let request_inputs = inputs(&[
        ("description", "checkout flow for the product catalog"),
        ("timeline", "two quarters"),
    ]);

    let result = service
        .generate(GenerateRequest::new(
            "Cartwheel",
            request_inputs.clone(),
            DocumentType::Frd,
        ))
        .await;

    let context = service
        .retriever()
        .retrieve(&input_text(&request_inputs), DocumentType::Frd);
    let expected = template_document("Cartwheel", &request_inputs, &context, None).content();

    assert!(result.success);
    assert_eq!(result.content, expected);
    assert_eq!(
        result.metadata.fallback_reason,
        Some(FallbackReason::MalformedOutput)
    );
}

#[test]
fn scenario_d_keyword_overlap_finds_the_seeded_document() {
    let mut index = InMemoryIndex::keyword_overlap();
    let doc = KnowledgeDocument::new(
        Domain::Banking,
        KnowledgeKind::BestPractice,
        "require multi-factor authentication",
    );
    assert_eq!(
        doc.text,
        "Best Practice for banking: require multi-factor authentication"
    );
    index.add(vec![doc.text.clone()], vec![doc.metadata()]).unwrap();

    let hits = index
        .search("multi-factor authentication banking", 5, &QueryFilters::default())
        .unwrap();
    assert_eq!(hits[0].text, doc.text);
    assert!(hits[0].score > 0.0);
}

#[test]
fn search_respects_k_and_orders_by_score() {
    let knowledge = knowledge();
    let mut index = InMemoryIndex::with_engine(Arc::new(SimpleEmbedEngine::default()));
    knowledge.seed_index(&mut index).unwrap();

    for k in [0, 1, 3, 7] {
        let hits = index
            .search("real-time fraud monitoring for transactions", k, &QueryFilters::default())
            .unwrap();
        assert!(hits.len() <= k);
        assert!(hits.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    let empty = InMemoryIndex::with_engine(Arc::new(SimpleEmbedEngine::default()));
    assert!(empty
        .search("anything at all", 5, &QueryFilters::default())
        .unwrap()
        .is_empty());
}

#[test]
fn classification_is_deterministic_and_defaults_to_general() {
    let classifier = DomainClassifier::new(knowledge());
    for text in ["", "quarterly offsite agenda", "shipment tracking for freight"] {
        assert_eq!(classifier.classify(text), classifier.classify(text));
    }
    assert_eq!(classifier.classify("quarterly offsite agenda"), Domain::General);
    assert_eq!(
        classifier.classify("shipment tracking for freight"),
        Domain::Logistics
    );
}

#[test]
fn strategies_and_reports_keep_their_invariants() {
    let knowledge = knowledge();
    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryIndex::keyword_overlap());
    let service = GenerationService::new(
        Arc::clone(&knowledge),
        index,
        None,
        ServiceConfig::default(),
    );
    let evaluator = QualityEvaluator::new(knowledge);

    let texts = [
        "patient intake with api integration and workflow automation",
        "campaign dashboard reporting",
        "generic office move",
        "policy claim underwriting",
    ];
    for text in texts {
        let context = service.retriever().retrieve(text, DocumentType::Brd);
        let strategy = StrategyPlanner.plan(text, &context);
        assert!((strategy.template_weight() + strategy.ai_creativity() - 1.0).abs() < 1e-12);
        assert_eq!(
            strategy.validation_strictness(),
            StrategyPlanner
                .plan("unrelated text", &context)
                .validation_strictness()
        );

        let report = evaluator.evaluate(&format!("# Summary\n- {text}"), &context);
        let scores = [
            report.completeness(),
            report.domain_relevance(),
            report.structure_quality(),
            report.compliance_coverage(),
        ];
        assert!(scores.iter().all(|score| (0.0..=1.0).contains(score)));
        let mean = scores.iter().sum::<f64>() / 4.0;
        assert!((report.overall() - mean).abs() < 1e-12);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_service() {
    let service = Arc::new(service_with(Arc::new(AlwaysFails)));
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let request = GenerateRequest::new(
                    format!("Project {n}"),
                    inputs(&[("scope", "account reconciliation")]),
                    DocumentType::Srs,
                );
                service.generate(request).await
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        assert!(result.success);
        assert!(result.content.contains(&format!("Project {n}")));
        assert_eq!(result.metadata.domain, Domain::Banking);
    }
}
