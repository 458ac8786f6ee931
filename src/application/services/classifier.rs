use std::sync::Arc;

use tracing::debug;

use crate::{domain::Domain, infrastructure::knowledge::KnowledgeStore};

/// Bag-of-words domain classifier over the knowledge table.
#[derive(Clone)]
pub struct DomainClassifier {
    knowledge: Arc<KnowledgeStore>,
}

impl DomainClassifier {
    pub fn new(knowledge: Arc<KnowledgeStore>) -> Self {
        Self { knowledge }
    }

    /// Weighted keyword score of every profiled domain, in canonical order.
    pub fn scores(&self, text: &str) -> Vec<(Domain, f64)> {
        let lowered = text.to_lowercase();
        self.knowledge
            .profiles()
            .iter()
            .map(|profile| {
                let score = profile
                    .keywords
                    .iter()
                    .map(|keyword| {
                        lowered.matches(keyword.as_str()).count() as f64
                            * profile.weight(keyword)
                    })
                    .sum();
                (profile.name, score)
            })
            .collect()
    }

    /// Highest scoring domain; the earliest one wins ties. `General` when nothing matches.
    pub fn classify(&self, text: &str) -> Domain {
        let mut best = (Domain::General, 0.0_f64);
        for (domain, score) in self.scores(text) {
            if score > best.1 {
                best = (domain, score);
            }
        }

        debug!(
            target: "docsmith::classifier",
            domain = %best.0,
            score = best.1,
            "classified input"
        );
        best.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DomainClassifier {
        DomainClassifier::new(Arc::new(KnowledgeStore::builtin()))
    }

    #[test]
    fn keywords_count_inside_longer_words() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify("manage backorders, preorders and reorders"),
            Domain::Ecommerce
        );
        assert_eq!(classifier.classify("subaccounts for ledger"), Domain::Banking);
        assert_eq!(classifier.classify("Patients' PATIENT files"), Domain::Healthcare);
    }

    #[test]
    fn no_matches_means_general() {
        assert_eq!(classifier().classify("zzz qqq lorem ipsum"), Domain::General);
        assert_eq!(classifier().classify(""), Domain::General);
    }

    #[test]
    fn anchors_outweigh_plain_keywords() {
        // "product" counts double, so ecommerce beats banking's single "transaction".
        let domain = classifier().classify("product transaction");
        assert_eq!(domain, Domain::Ecommerce);
    }

    #[test]
    fn ties_go_to_the_earliest_domain() {
        // "payment" is a plain keyword of both banking and ecommerce.
        assert_eq!(classifier().classify("payment"), Domain::Banking);
    }

    #[test]
    fn healthcare_text_is_recognised() {
        let text = "patient patient patient medical medical medical clinical clinical clinical";
        let classifier = classifier();
        assert_eq!(classifier.classify(text), Domain::Healthcare);
        assert_eq!(classifier.classify(text), classifier.classify(text));
    }
}
