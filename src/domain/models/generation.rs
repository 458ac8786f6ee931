use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Domain, DocumentType};

/// Where a context entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum EntryOrigin {
    /// Static fact from the domain profile.
    Base,
    /// Semantic search hit merged on top of the baseline.
    Retrieved { score: f32 },
}

/// A best practice or example line together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEntry {
    pub text: String,
    #[serde(flatten)]
    pub origin: EntryOrigin,
}

impl ContextEntry {
    pub fn base(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: EntryOrigin::Base,
        }
    }

    pub fn retrieved(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            origin: EntryOrigin::Retrieved { score },
        }
    }

    pub fn is_retrieved(&self) -> bool {
        matches!(self.origin, EntryOrigin::Retrieved { .. })
    }
}

impl fmt::Display for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            EntryOrigin::Base => f.write_str(&self.text),
            EntryOrigin::Retrieved { .. } => write!(f, "{} (retrieved)", self.text),
        }
    }
}

/// Per-request bundle of domain facts plus semantic enrichments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalContext {
    pub domain: Domain,
    pub doc_type: DocumentType,
    pub templates: Vec<String>,
    pub best_practices: Vec<ContextEntry>,
    pub examples: Vec<ContextEntry>,
    pub validation_rules: Vec<String>,
    pub stakeholders: Vec<String>,
    pub compliance_requirements: Vec<String>,
}

impl RetrievalContext {
    /// Number of entries that came from semantic search rather than the profile.
    pub fn enrichment_count(&self) -> usize {
        self.best_practices
            .iter()
            .chain(self.examples.iter())
            .filter(|entry| entry.is_retrieved())
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Enhancement {
    Basic,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strictness {
    Relaxed,
    Standard,
    Strict,
}

/// Derived tuning parameters for one generation run.
///
/// Fields are private so `ai_creativity` can only ever be `1 - template_weight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStrategy {
    complexity: Complexity,
    enhancement: Enhancement,
    template_weight: f64,
    ai_creativity: f64,
    validation_strictness: Strictness,
}

impl GenerationStrategy {
    pub fn new(
        complexity: Complexity,
        enhancement: Enhancement,
        template_weight: f64,
        validation_strictness: Strictness,
    ) -> Self {
        let template_weight = template_weight.clamp(0.0, 1.0);
        Self {
            complexity,
            enhancement,
            template_weight,
            ai_creativity: 1.0 - template_weight,
            validation_strictness,
        }
    }

    pub fn complexity(&self) -> Complexity {
        self.complexity
    }

    pub fn enhancement(&self) -> Enhancement {
        self.enhancement
    }

    pub fn template_weight(&self) -> f64 {
        self.template_weight
    }

    pub fn ai_creativity(&self) -> f64 {
        self.ai_creativity
    }

    pub fn validation_strictness(&self) -> Strictness {
        self.validation_strictness
    }
}

/// Post-hoc quality scores of a synthesized document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    completeness: f64,
    domain_relevance: f64,
    structure_quality: f64,
    compliance_coverage: f64,
    overall: f64,
    recommendations: Vec<String>,
}

impl QualityReport {
    /// Builds a report; every score is clamped to `[0, 1]` and `overall` is their mean.
    pub fn new(
        completeness: f64,
        domain_relevance: f64,
        structure_quality: f64,
        compliance_coverage: f64,
    ) -> Self {
        let scores = [
            completeness,
            domain_relevance,
            structure_quality,
            compliance_coverage,
        ]
        .map(unit);
        Self {
            completeness: scores[0],
            domain_relevance: scores[1],
            structure_quality: scores[2],
            compliance_coverage: scores[3],
            overall: scores.iter().sum::<f64>() / scores.len() as f64,
            recommendations: Vec::new(),
        }
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn completeness(&self) -> f64 {
        self.completeness
    }

    pub fn domain_relevance(&self) -> f64 {
        self.domain_relevance
    }

    pub fn structure_quality(&self) -> f64 {
        self.structure_quality
    }

    pub fn compliance_coverage(&self) -> f64 {
        self.compliance_coverage
    }

    pub fn overall(&self) -> f64 {
        self.overall
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }
}

fn unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
