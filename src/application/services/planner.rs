use tracing::debug;

use crate::domain::{
    Complexity, Domain, Enhancement, GenerationStrategy, RetrievalContext, Strictness,
};

const HIGH_COMPLEXITY: [&str; 8] = [
    "integration",
    "api",
    "workflow",
    "automation",
    "analytics",
    "machine learning",
    "ai",
    "complex business rules",
];

const MEDIUM_COMPLEXITY: [&str; 6] = [
    "reporting",
    "dashboard",
    "user management",
    "notification",
    "validation",
    "approval process",
];

/// Domains that get expert enhancement and strict validation.
const HIGH_COMPLIANCE: [Domain; 2] = [Domain::Healthcare, Domain::Banking];

/// Domains validated with standard strictness.
const STANDARD_COMPLIANCE: [Domain; 2] = [Domain::Ecommerce, Domain::Marketing];

/// Weight used for any complexity/enhancement pair without a tuned value.
pub const DEFAULT_TEMPLATE_WEIGHT: f64 = 0.5;

/// Counts occurrences of `keyword` in `text` that begin at a word boundary.
///
/// Both arguments are expected lowercased. Matching is by prefix, so
/// `api` counts inside `apis` but `ai` does not count inside `maintain`.
fn keyword_frequency(text: &str, keyword: &str) -> usize {
    if keyword.is_empty() {
        return 0;
    }
    text.match_indices(keyword)
        .filter(|(start, _)| {
            text[..*start]
                .chars()
                .next_back()
                .map_or(true, |prev| !prev.is_alphanumeric())
        })
        .count()
}

/// Pure strategy derivation from input text and the retrieval context.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyPlanner;

impl StrategyPlanner {
    pub fn plan(&self, text: &str, context: &RetrievalContext) -> GenerationStrategy {
        let complexity = complexity(text);
        let enhancement = enhancement(context.domain, context.best_practices.len());
        let strategy = GenerationStrategy::new(
            complexity,
            enhancement,
            template_weight(complexity, enhancement),
            strictness(context.domain),
        );

        debug!(
            target: "docsmith::planner",
            ?complexity,
            ?enhancement,
            template_weight = strategy.template_weight(),
            "strategy planned"
        );
        strategy
    }
}

pub fn complexity(text: &str) -> Complexity {
    let lowered = text.to_lowercase();
    let count = |list: &[&str]| -> usize {
        list.iter()
            .map(|keyword| keyword_frequency(&lowered, keyword))
            .sum()
    };

    let high = count(&HIGH_COMPLEXITY);
    let medium = count(&MEDIUM_COMPLEXITY);
    if high >= 3 {
        Complexity::High
    } else if high >= 1 || medium >= 3 {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

pub fn enhancement(domain: Domain, best_practices: usize) -> Enhancement {
    if HIGH_COMPLIANCE.contains(&domain) {
        Enhancement::Expert
    } else if best_practices > 5 {
        Enhancement::Advanced
    } else {
        Enhancement::Basic
    }
}

pub fn template_weight(complexity: Complexity, enhancement: Enhancement) -> f64 {
    match (complexity, enhancement) {
        (Complexity::Low, Enhancement::Basic) => 0.8,
        (Complexity::Low, Enhancement::Advanced) => 0.6,
        (Complexity::Low, Enhancement::Expert) => DEFAULT_TEMPLATE_WEIGHT,
        (Complexity::Medium, Enhancement::Basic) => 0.7,
        (Complexity::Medium, Enhancement::Advanced) => 0.5,
        (Complexity::Medium, Enhancement::Expert) => DEFAULT_TEMPLATE_WEIGHT,
        (Complexity::High, Enhancement::Basic) => DEFAULT_TEMPLATE_WEIGHT,
        (Complexity::High, Enhancement::Advanced) => DEFAULT_TEMPLATE_WEIGHT,
        (Complexity::High, Enhancement::Expert) => 0.4,
    }
}

/// Depends on the domain alone.
pub fn strictness(domain: Domain) -> Strictness {
    if HIGH_COMPLIANCE.contains(&domain) {
        Strictness::Strict
    } else if STANDARD_COMPLIANCE.contains(&domain) {
        Strictness::Standard
    } else {
        Strictness::Relaxed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{application::services::retriever::general_context, domain::DocumentType};

    #[test]
    fn frequency_respects_word_starts() {
        assert_eq!(keyword_frequency("apis and api", "api"), 2);
        assert_eq!(keyword_frequency("maintain the chain", "ai"), 0);
        assert_eq!(keyword_frequency("ai-driven, (ai)", "ai"), 2);
        assert_eq!(keyword_frequency("anything", ""), 0);
    }

    #[test]
    fn complexity_thresholds() {
        assert_eq!(complexity("simple intake form"), Complexity::Low);
        assert_eq!(complexity("nightly api sync"), Complexity::Medium);
        assert_eq!(
            complexity("reporting dashboard notification"),
            Complexity::Medium
        );
        assert_eq!(
            complexity("API integration with workflow automation"),
            Complexity::High
        );
        // "ai" inside "maintain" must not count.
        assert_eq!(complexity("maintain records"), Complexity::Low);
    }

    #[test]
    fn enhancement_prefers_compliance_then_breadth() {
        assert_eq!(enhancement(Domain::Banking, 0), Enhancement::Expert);
        assert_eq!(enhancement(Domain::Logistics, 6), Enhancement::Advanced);
        assert_eq!(enhancement(Domain::Logistics, 5), Enhancement::Basic);
    }

    #[test]
    fn weights_follow_the_table() {
        assert_eq!(template_weight(Complexity::Low, Enhancement::Basic), 0.8);
        assert_eq!(template_weight(Complexity::High, Enhancement::Expert), 0.4);
        assert_eq!(
            template_weight(Complexity::Low, Enhancement::Expert),
            DEFAULT_TEMPLATE_WEIGHT
        );
    }

    #[test]
    fn strictness_is_a_function_of_domain() {
        assert_eq!(strictness(Domain::Healthcare), Strictness::Strict);
        assert_eq!(strictness(Domain::Marketing), Strictness::Standard);
        assert_eq!(strictness(Domain::General), Strictness::Relaxed);
        assert_eq!(strictness(Domain::Aif), strictness(Domain::Aif));
    }

    #[test]
    fn planned_strategy_keeps_creativity_complementary() {
        let context = general_context(DocumentType::Brd);
        let strategy = StrategyPlanner.plan("a plain intake form", &context);
        assert_eq!(strategy.complexity(), Complexity::Low);
        assert_eq!(strategy.enhancement(), Enhancement::Basic);
        assert!((strategy.template_weight() + strategy.ai_creativity() - 1.0).abs() < 1e-12);
    }
}
