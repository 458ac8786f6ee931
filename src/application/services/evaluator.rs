use std::sync::Arc;

use tracing::debug;

use super::synthesizer::REQUIRED_SECTIONS;
use crate::{
    domain::{QualityReport, RetrievalContext},
    infrastructure::knowledge::KnowledgeStore,
};

/// Score used for axes that have nothing to measure against.
pub const NEUTRAL_SCORE: f64 = 0.8;

const STRUCTURE_MARKERS: usize = 6;

/// Post-hoc scoring of a synthesized document. Advisory only.
#[derive(Clone)]
pub struct QualityEvaluator {
    knowledge: Arc<KnowledgeStore>,
}

impl QualityEvaluator {
    pub fn new(knowledge: Arc<KnowledgeStore>) -> Self {
        Self { knowledge }
    }

    pub fn evaluate(&self, content: &str, context: &RetrievalContext) -> QualityReport {
        let lowered = content.to_lowercase();

        let missing: Vec<&str> = REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|section| !lowered.contains(section))
            .collect();
        let completeness =
            (REQUIRED_SECTIONS.len() - missing.len()) as f64 / REQUIRED_SECTIONS.len() as f64;

        let report = QualityReport::new(
            completeness,
            self.domain_relevance(&lowered, context),
            structure_quality(content),
            compliance_coverage(&lowered, &context.compliance_requirements),
        );
        let recommendations = recommendations(&report, &missing, context);

        debug!(
            target: "docsmith::evaluator",
            overall = report.overall(),
            "document scored"
        );
        report.with_recommendations(recommendations)
    }

    fn domain_relevance(&self, lowered: &str, context: &RetrievalContext) -> f64 {
        let Some(profile) = self.knowledge.profile(context.domain) else {
            return NEUTRAL_SCORE;
        };
        if profile.keywords.is_empty() {
            return NEUTRAL_SCORE;
        }
        let hits = profile
            .keywords
            .iter()
            .filter(|keyword| lowered.contains(keyword.as_str()))
            .count();
        (hits as f64 / profile.keywords.len() as f64).min(1.0)
    }
}

/// Fraction of the six Markdown markers (`#`, `##`, `###`, bullets, numbered
/// items, bold lead-ins) that appear at the start of some line.
fn structure_quality(content: &str) -> f64 {
    let mut seen = [false; STRUCTURE_MARKERS];
    for line in content.lines().map(str::trim_start) {
        seen[0] |= line.starts_with("# ");
        seen[1] |= line.starts_with("## ");
        seen[2] |= line.starts_with("### ");
        seen[3] |= line.starts_with("- ") || line.starts_with("* ");
        seen[4] |= is_numbered(line);
        seen[5] |= line.starts_with("**");
    }
    let found = seen.iter().filter(|marker| **marker).count();
    (found as f64 / STRUCTURE_MARKERS as f64).min(1.0)
}

fn is_numbered(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(". ")
}

/// A term counts as covered when any of its words appears in the content.
fn compliance_coverage(lowered: &str, requirements: &[String]) -> f64 {
    if requirements.is_empty() {
        return NEUTRAL_SCORE;
    }
    let covered = requirements
        .iter()
        .filter(|term| {
            term.split_whitespace()
                .any(|word| lowered.contains(&word.to_lowercase()))
        })
        .count();
    covered as f64 / requirements.len() as f64
}

fn recommendations(
    report: &QualityReport,
    missing: &[&str],
    context: &RetrievalContext,
) -> Vec<String> {
    let mut out = Vec::new();
    if report.completeness() < 0.7 {
        out.push(format!("Add missing sections: {}", missing.join(", ")));
    }
    if report.domain_relevance() < 0.6 {
        out.push(format!(
            "Include more {}-specific terminology and concepts",
            context.domain.label()
        ));
    }
    if report.structure_quality() < 0.6 {
        out.push("Improve document structure with headings, lists and formatting".to_string());
    }
    if report.compliance_coverage() < 0.5 {
        out.push(format!(
            "Address compliance requirements: {}",
            context.compliance_requirements.join(", ")
        ));
    }
    if report.overall() >= 0.8 {
        out.push("Document quality meets high standards".to_string());
    }
    out
}
