use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Domain, DocumentType};
use crate::domain::DomainError;

/// Weight applied to keywords without an explicit entry in `keyword_weights`.
pub const DEFAULT_KEYWORD_WEIGHT: f64 = 1.0;

/// Provenance tag of a knowledge fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeKind {
    BestPractice,
    Compliance,
    ValidationRule,
}

impl KnowledgeKind {
    pub fn label(&self) -> &'static str {
        match self {
            KnowledgeKind::BestPractice => "Best Practice",
            KnowledgeKind::Compliance => "Compliance Requirement",
            KnowledgeKind::ValidationRule => "Validation Rule",
        }
    }
}

/// Metadata stored next to every indexed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub kind: KnowledgeKind,
    pub domain: Domain,
    /// The bare fact, without the searchable prefix.
    pub content: String,
}

/// Supported filters for narrowing index search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    pub domain: Option<Domain>,
    pub kind: Option<KnowledgeKind>,
}

impl QueryFilters {
    pub fn domain(domain: Domain) -> Self {
        Self {
            domain: Some(domain),
            kind: None,
        }
    }

    pub fn matches(&self, metadata: &DocumentMetadata) -> bool {
        if let Some(domain) = self.domain {
            if metadata.domain != domain {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if metadata.kind != kind {
                return false;
            }
        }
        true
    }
}

/// Immutable knowledge fragment flattened out of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub text: String,
    pub domain: Domain,
    pub kind: KnowledgeKind,
    pub content: String,
}

impl KnowledgeDocument {
    pub fn new(domain: Domain, kind: KnowledgeKind, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            text: format!("{} for {}: {}", kind.label(), domain.as_str(), content),
            domain,
            kind,
            content,
        }
    }

    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            kind: self.kind,
            domain: self.domain,
            content: self.content.clone(),
        }
    }
}

/// Curated, read-only knowledge for one business vertical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainProfile {
    pub name: Domain,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub keyword_weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub compliance_terms: Vec<String>,
    #[serde(default)]
    pub best_practices: Vec<String>,
    #[serde(default)]
    pub validation_rules: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub templates: BTreeMap<DocumentType, String>,
}

impl DomainProfile {
    pub fn weight(&self, keyword: &str) -> f64 {
        self.keyword_weights
            .get(keyword)
            .copied()
            .unwrap_or(DEFAULT_KEYWORD_WEIGHT)
    }

    pub fn template(&self, doc_type: DocumentType) -> Option<&str> {
        self.templates
            .get(&doc_type)
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
    }

    /// Flattens best practices, compliance terms and validation rules into
    /// searchable documents.
    pub fn documents(&self) -> Vec<KnowledgeDocument> {
        let practices = self
            .best_practices
            .iter()
            .map(|p| KnowledgeDocument::new(self.name, KnowledgeKind::BestPractice, p));
        let compliance = self
            .compliance_terms
            .iter()
            .map(|c| KnowledgeDocument::new(self.name, KnowledgeKind::Compliance, c));
        let rules = self
            .validation_rules
            .iter()
            .map(|r| KnowledgeDocument::new(self.name, KnowledgeKind::ValidationRule, r));
        practices.chain(compliance).chain(rules).collect()
    }

    /// Lowercases keywords, drops duplicates and checks basic invariants.
    pub fn normalized(mut self) -> Result<Self, DomainError> {
        if self.name.is_general() {
            return Err(DomainError::knowledge(
                "the general domain cannot carry a profile",
            ));
        }

        let mut seen = Vec::with_capacity(self.keywords.len());
        for keyword in self.keywords.drain(..) {
            let normalized = keyword.trim().to_lowercase();
            if !normalized.is_empty() && !seen.contains(&normalized) {
                seen.push(normalized);
            }
        }
        if seen.is_empty() {
            return Err(DomainError::knowledge(format!(
                "profile `{}` has no keywords",
                self.name
            )));
        }
        self.keywords = seen;

        self.keyword_weights = std::mem::take(&mut self.keyword_weights)
            .into_iter()
            .map(|(k, w)| (k.trim().to_lowercase(), w))
            .collect();
        if let Some((keyword, weight)) = self
            .keyword_weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(DomainError::knowledge(format!(
                "profile `{}` has invalid weight {weight} for `{keyword}`",
                self.name
            )));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DomainProfile {
        DomainProfile {
            name: Domain::Banking,
            keywords: vec!["Account".into(), "account".into(), " fraud ".into()],
            keyword_weights: BTreeMap::from([("ACCOUNT".to_string(), 2.0)]),
            stakeholders: vec![],
            compliance_terms: vec!["PCI DSS".into()],
            best_practices: vec!["Require multi-factor authentication".into()],
            validation_rules: vec!["Validate limits".into()],
            examples: vec![],
            templates: BTreeMap::new(),
        }
    }

    #[test]
    fn normalization_dedupes_and_lowercases() {
        let profile = profile().normalized().unwrap();
        assert_eq!(profile.keywords, vec!["account", "fraud"]);
        assert_eq!(profile.weight("account"), 2.0);
        assert_eq!(profile.weight("fraud"), DEFAULT_KEYWORD_WEIGHT);
    }

    #[test]
    fn documents_carry_provenance() {
        let docs = profile().documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(
            docs[0].text,
            "Best Practice for banking: Require multi-factor authentication"
        );
        assert_eq!(docs[1].kind, KnowledgeKind::Compliance);
        assert_eq!(docs[2].metadata().content, "Validate limits");
    }

    #[test]
    fn filters_match_on_every_set_field() {
        let meta = KnowledgeDocument::new(Domain::Banking, KnowledgeKind::Compliance, "SOX").metadata();
        assert!(QueryFilters::default().matches(&meta));
        assert!(QueryFilters::domain(Domain::Banking).matches(&meta));
        assert!(!QueryFilters::domain(Domain::Healthcare).matches(&meta));
        let by_kind = QueryFilters {
            domain: Some(Domain::Banking),
            kind: Some(KnowledgeKind::BestPractice),
        };
        assert!(!by_kind.matches(&meta));
    }

    #[test]
    fn general_profile_is_rejected() {
        let mut general = profile();
        general.name = Domain::General;
        assert!(general.normalized().is_err());
    }
}
