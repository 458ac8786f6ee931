use std::sync::Arc;

use tracing::{debug, warn};

use super::{classifier::DomainClassifier, generation_service::VectorIndex};
use crate::{
    domain::{
        ContextEntry, DocumentType, Domain, DomainProfile, KnowledgeKind, QueryFilters,
        RetrievalContext,
    },
    infrastructure::knowledge::{
        KnowledgeStore, GENERAL_BEST_PRACTICES, GENERAL_EXAMPLES, GENERAL_STAKEHOLDERS,
        GENERAL_TEMPLATE, GENERAL_VALIDATION_RULES,
    },
};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.7;

/// Builds the per-request context: domain baseline plus semantic enrichments.
#[derive(Clone)]
pub struct ContextRetriever {
    knowledge: Arc<KnowledgeStore>,
    classifier: DomainClassifier,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    threshold: f32,
}

impl ContextRetriever {
    pub fn new(knowledge: Arc<KnowledgeStore>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            classifier: DomainClassifier::new(knowledge.clone()),
            knowledge,
            index,
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_RELEVANCE_THRESHOLD,
        }
    }

    pub fn with_limits(mut self, top_k: usize, threshold: f32) -> Self {
        self.top_k = top_k;
        self.threshold = threshold;
        self
    }

    pub fn classifier(&self) -> &DomainClassifier {
        &self.classifier
    }

    pub fn retrieve(&self, text: &str, doc_type: DocumentType) -> RetrievalContext {
        let domain = self.classifier.classify(text);
        match self.knowledge.profile(domain) {
            Some(profile) => self.enriched(profile, text, doc_type),
            None => general_context(doc_type),
        }
    }

    fn enriched(&self, profile: &DomainProfile, text: &str, doc_type: DocumentType) -> RetrievalContext {
        let mut context = RetrievalContext {
            domain: profile.name,
            doc_type,
            templates: profile
                .template(doc_type)
                .map(|template| vec![template.to_string()])
                .unwrap_or_default(),
            best_practices: profile
                .best_practices
                .iter()
                .map(ContextEntry::base)
                .collect(),
            examples: profile.examples.iter().map(ContextEntry::base).collect(),
            validation_rules: profile.validation_rules.clone(),
            stakeholders: profile.stakeholders.clone(),
            compliance_requirements: profile.compliance_terms.clone(),
        };

        let hits = match self
            .index
            .search(text, self.top_k, &QueryFilters::domain(profile.name))
        {
            Ok(hits) => hits,
            Err(err) => {
                warn!(
                    target: "docsmith::retriever",
                    domain = %profile.name,
                    error = %err,
                    "semantic search failed; using domain baseline only"
                );
                return context;
            }
        };

        for hit in hits.into_iter().filter(|hit| hit.score > self.threshold) {
            match hit.metadata.kind {
                KnowledgeKind::BestPractice => context
                    .best_practices
                    .push(ContextEntry::retrieved(hit.metadata.content, hit.score)),
                KnowledgeKind::ValidationRule => context
                    .examples
                    .push(ContextEntry::retrieved(hit.metadata.content, hit.score)),
                KnowledgeKind::Compliance => {}
            }
        }

        debug!(
            target: "docsmith::retriever",
            domain = %profile.name,
            enrichments = context.enrichment_count(),
            "context retrieved"
        );
        context
    }
}

/// Fixed context used when no domain matches.
pub fn general_context(doc_type: DocumentType) -> RetrievalContext {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    RetrievalContext {
        domain: Domain::General,
        doc_type,
        templates: vec![GENERAL_TEMPLATE.to_string()],
        best_practices: GENERAL_BEST_PRACTICES
            .iter()
            .copied()
            .map(ContextEntry::base)
            .collect(),
        examples: GENERAL_EXAMPLES.iter().copied().map(ContextEntry::base).collect(),
        validation_rules: owned(&GENERAL_VALIDATION_RULES),
        stakeholders: owned(&GENERAL_STAKEHOLDERS),
        compliance_requirements: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::services::SearchHit,
        domain::{DocumentMetadata, DomainError},
        infrastructure::index::InMemoryIndex,
    };

    struct FixedIndex(Vec<SearchHit>);

    impl VectorIndex for FixedIndex {
        fn search(
            &self,
            _query: &str,
            limit: usize,
            filters: &QueryFilters,
        ) -> Result<Vec<SearchHit>, DomainError> {
            Ok(self
                .0
                .iter()
                .filter(|hit| filters.matches(&hit.metadata))
                .take(limit)
                .cloned()
                .collect())
        }

        fn len(&self) -> usize {
            self.0.len()
        }

        fn scoring(&self) -> String {
            "fixed".into()
        }
    }

    struct BrokenIndex;

    impl VectorIndex for BrokenIndex {
        fn search(&self, _: &str, _: usize, _: &QueryFilters) -> Result<Vec<SearchHit>, DomainError> {
            Err(DomainError::other("index offline"))
        }

        fn len(&self) -> usize {
            0
        }

        fn scoring(&self) -> String {
            "broken".into()
        }
    }

    fn hit(domain: Domain, kind: KnowledgeKind, content: &str, score: f32) -> SearchHit {
        SearchHit {
            text: content.to_string(),
            metadata: DocumentMetadata {
                kind,
                domain,
                content: content.to_string(),
            },
            score,
        }
    }

    fn retriever(index: Arc<dyn VectorIndex>) -> ContextRetriever {
        ContextRetriever::new(Arc::new(KnowledgeStore::builtin()), index)
    }

    #[test]
    fn general_input_gets_fixed_context() {
        let context = retriever(Arc::new(InMemoryIndex::keyword_overlap()))
            .retrieve("nothing recognisable here", DocumentType::Brd);
        assert_eq!(context.domain, Domain::General);
        assert!(context.compliance_requirements.is_empty());
        assert_eq!(context.stakeholders.len(), 3);
        assert_eq!(context.enrichment_count(), 0);
    }

    #[test]
    fn hits_above_threshold_are_appended_after_baseline() {
        let index = FixedIndex(vec![
            hit(Domain::Banking, KnowledgeKind::BestPractice, "Rotate keys", 0.91),
            hit(Domain::Banking, KnowledgeKind::ValidationRule, "Check limits", 0.75),
            hit(Domain::Banking, KnowledgeKind::Compliance, "SOX", 0.99),
            hit(Domain::Banking, KnowledgeKind::BestPractice, "Weak match", 0.7),
            hit(Domain::Healthcare, KnowledgeKind::BestPractice, "Other domain", 0.95),
        ]);
        let context = retriever(Arc::new(index)).retrieve("account transaction", DocumentType::Brd);

        assert_eq!(context.domain, Domain::Banking);
        assert_eq!(context.best_practices.len(), 5);
        assert!(!context.best_practices[0].is_retrieved());
        assert_eq!(context.best_practices[4].text, "Rotate keys");
        assert_eq!(context.examples.last().unwrap().text, "Check limits");
        assert_eq!(context.enrichment_count(), 2);
        assert_eq!(context.templates.len(), 1);
    }

    #[test]
    fn search_failure_keeps_the_baseline() {
        let context = retriever(Arc::new(BrokenIndex)).retrieve("patient records", DocumentType::Frd);
        assert_eq!(context.domain, Domain::Healthcare);
        assert_eq!(context.best_practices.len(), 4);
        assert_eq!(context.enrichment_count(), 0);
    }
}
