use std::{fmt::Write as _, sync::Arc, time::Duration};

use tracing::{info, warn};

use super::generation_service::{CompletionParams, GenerationProvider, ModelTier};
use crate::{
    application::dtos::{FallbackReason, SynthesisPath},
    domain::{
        Complexity, DocumentType, DomainError, Enhancement, GenerationInputs, GenerationStrategy,
        RetrievalContext,
    },
};

/// Section keywords of which at least one must appear in an accepted document.
pub const REQUIRED_SECTIONS: [&str; 4] = ["summary", "requirements", "scope", "objectives"];

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Output of one synthesis run. The footer is provenance and is never graded.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub body: String,
    pub footer: Option<String>,
    pub path: SynthesisPath,
    pub fallback_reason: Option<FallbackReason>,
}

impl Synthesis {
    pub fn content(&self) -> String {
        match &self.footer {
            Some(footer) => format!("{}\n\n{}", self.body.trim_end(), footer),
            None => self.body.clone(),
        }
    }
}

/// Builds prompts, calls the provider and falls back to templating.
#[derive(Clone)]
pub struct ContentSynthesizer {
    provider: Option<Arc<dyn GenerationProvider>>,
    timeout: Duration,
}

impl ContentSynthesizer {
    pub fn new(provider: Option<Arc<dyn GenerationProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|provider| provider.name())
    }

    pub async fn synthesize(
        &self,
        project: &str,
        inputs: &GenerationInputs,
        context: &RetrievalContext,
        strategy: &GenerationStrategy,
    ) -> Synthesis {
        let Some(provider) = self.provider.clone() else {
            info!(target: "docsmith::synthesizer", "no generation provider configured");
            return template_document(project, inputs, context, Some(FallbackReason::NoProvider));
        };

        let prompt = build_prompt(project, inputs, context, strategy);
        let params = completion_params(strategy);
        let call = tokio::task::spawn_blocking(move || provider.complete(&prompt, &params));

        let reason = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(raw))) => match accept_response(&raw) {
                Ok(body) => {
                    return Synthesis {
                        body,
                        footer: provenance_footer(context),
                        path: SynthesisPath::Provider,
                        fallback_reason: None,
                    };
                }
                Err(err) => {
                    warn!(target: "docsmith::synthesizer", error = %err, "provider output rejected");
                    FallbackReason::MalformedOutput
                }
            },
            Ok(Ok(Err(err))) => {
                warn!(target: "docsmith::synthesizer", error = %err, "generation provider failed");
                FallbackReason::ProviderError
            }
            Ok(Err(join_err)) => {
                warn!(target: "docsmith::synthesizer", error = %join_err, "generation task aborted");
                FallbackReason::ProviderError
            }
            Err(_) => {
                let err = DomainError::GenerationTimeout(millis(self.timeout));
                warn!(target: "docsmith::synthesizer", error = %err, "abandoning provider call");
                FallbackReason::Timeout
            }
        };

        template_document(project, inputs, context, Some(reason))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub fn completion_params(strategy: &GenerationStrategy) -> CompletionParams {
    CompletionParams {
        temperature: strategy.ai_creativity() * 0.8,
        max_tokens: if strategy.complexity() == Complexity::High {
            3000
        } else {
            2000
        },
        model_tier: if strategy.enhancement() == Enhancement::Expert {
            ModelTier::Expert
        } else {
            ModelTier::Standard
        },
    }
}

pub fn build_prompt(
    project: &str,
    inputs: &GenerationInputs,
    context: &RetrievalContext,
    strategy: &GenerationStrategy,
) -> String {
    let doc_type = context.doc_type;
    let mut prompt = format!(
        "Write a {} ({}) for the project \"{}\" in the {} domain.\n\n",
        doc_type.title(),
        doc_type,
        project,
        context.domain.label()
    );

    section(&mut prompt, "Stakeholders", &context.stakeholders);
    section(&mut prompt, "Compliance Requirements", &context.compliance_requirements);
    section(&mut prompt, "Best Practices", &context.best_practices);
    section(&mut prompt, "Validation Rules", &context.validation_rules);
    section(&mut prompt, "Reference Scenarios", &context.examples);

    let _ = write!(
        prompt,
        "## Strategy\n- Complexity: {:?}\n- Enhancement: {:?}\n- Template weight: {:.2}\n- Creativity: {:.2}\n- Validation strictness: {:?}\n\n",
        strategy.complexity(),
        strategy.enhancement(),
        strategy.template_weight(),
        strategy.ai_creativity(),
        strategy.validation_strictness()
    );

    prompt.push_str("## Inputs\n");
    prompt.push_str(&input_lines(inputs));
    prompt.push('\n');

    if !context.templates.is_empty() {
        prompt.push_str("## Templates\n");
        for template in &context.templates {
            prompt.push_str(template.trim_end());
            prompt.push_str("\n\n");
        }
    }

    let _ = write!(
        prompt,
        "## Output\nRespond in Markdown with `##` headings for: {}.\n",
        doc_type.outline().join(", ")
    );
    prompt
}

/// Strips code fences and checks that the document has at least one required section.
pub fn accept_response(raw: &str) -> Result<String, DomainError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(DomainError::malformed("provider returned an empty document"));
    }

    let lowered = body.to_lowercase();
    if !REQUIRED_SECTIONS
        .iter()
        .any(|section| lowered.contains(section))
    {
        return Err(DomainError::malformed(
            "document has none of the required sections",
        ));
    }
    Ok(body)
}

fn strip_code_fence(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string (`markdown`, `md`, ...) along with the fence.
        text = rest.split_once('\n').map_or("", |(_, body)| body);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

/// Domain provenance appended to every non-general document.
pub fn provenance_footer(context: &RetrievalContext) -> Option<String> {
    if context.domain.is_general() {
        return None;
    }
    let compliance = if context.compliance_requirements.is_empty() {
        "None identified".to_string()
    } else {
        context.compliance_requirements.join(", ")
    };
    Some(format!(
        "---\n**Domain:** {}\n**Compliance:** {}\n**Stakeholders:** {}\n",
        context.domain.label(),
        compliance,
        context.stakeholders.join(", ")
    ))
}

/// Deterministic, network-free document built from the outline and the context.
pub fn template_document(
    project: &str,
    inputs: &GenerationInputs,
    context: &RetrievalContext,
    reason: Option<FallbackReason>,
) -> Synthesis {
    let doc_type = context.doc_type;
    let mut body = format!(
        "# {}: {} ({})\n\n**Project:** {}\n**Domain:** {}\n\n",
        project,
        doc_type.title(),
        doc_type,
        project,
        context.domain.label()
    );

    for template in &context.templates {
        body.push_str(template.trim_end());
        body.push_str("\n\n");
    }

    for heading in doc_type.outline() {
        let _ = writeln!(body, "## {heading}\n");
        body.push_str(&section_body(heading, project, doc_type, inputs, context));
        body.push('\n');
    }

    Synthesis {
        body: body.trim_end().to_string(),
        footer: provenance_footer(context),
        path: SynthesisPath::TemplateFallback,
        fallback_reason: reason,
    }
}

fn section_body(
    heading: &str,
    project: &str,
    doc_type: DocumentType,
    inputs: &GenerationInputs,
    context: &RetrievalContext,
) -> String {
    match heading {
        "Executive Summary" | "Functional Overview" => format!(
            "This {} describes {} for the {} domain.\n",
            doc_type.title(),
            project,
            context.domain.label()
        ),
        "Business Objectives" | "Objectives" => bullets(&context.best_practices),
        "Requirements" | "Acceptance Criteria" => {
            let mut lines = bullets(&context.validation_rules);
            lines.push_str(&bullets(&context.compliance_requirements));
            lines
        }
        "Assumptions" => bullets(
            &context
                .stakeholders
                .iter()
                .map(|stakeholder| format!("{stakeholder} are available for review"))
                .collect::<Vec<_>>(),
        ),
        "Constraints" if context.compliance_requirements.is_empty() => {
            "- No regulatory constraints identified\n".to_string()
        }
        "Constraints" => bullets(
            &context
                .compliance_requirements
                .iter()
                .map(|term| format!("Must comply with {term}"))
                .collect::<Vec<_>>(),
        ),
        "User Stories" => {
            let actor = context
                .stakeholders
                .first()
                .map_or("user", String::as_str);
            bullets(
                &inputs
                    .values()
                    .flat_map(|value| value.fragments())
                    .map(|fragment| format!("As {actor}, I need {fragment}"))
                    .collect::<Vec<_>>(),
            )
        }
        "Data Models" => bullets(&context.examples),
        "Interfaces" => bullets(&context.stakeholders),
        _ => input_lines(inputs),
    }
}

fn section<T: std::fmt::Display>(prompt: &mut String, title: &str, items: &[T]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(prompt, "## {title}");
    prompt.push_str(&bullets(items));
    prompt.push('\n');
}

fn bullets<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| format!("- {item}\n")).collect()
}

fn input_lines(inputs: &GenerationInputs) -> String {
    inputs
        .iter()
        .filter(|(_, value)| !value.is_blank())
        .map(|(key, value)| format!("- **{key}**: {value}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::services::{planner::StrategyPlanner, retriever::general_context},
        domain::{Domain, InputValue, Strictness},
    };

    struct Scripted(Result<&'static str, &'static str>);

    impl GenerationProvider for Scripted {
        fn complete(&self, _prompt: &str, _params: &CompletionParams) -> Result<String, DomainError> {
            self.0
                .map(str::to_string)
                .map_err(DomainError::generation)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Sleepy;

    impl GenerationProvider for Sleepy {
        fn complete(&self, _prompt: &str, _params: &CompletionParams) -> Result<String, DomainError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok("## Summary\nlate".into())
        }

        fn name(&self) -> &str {
            "sleepy"
        }
    }

    fn inputs() -> GenerationInputs {
        let mut inputs = GenerationInputs::new();
        inputs.insert("scope".into(), "member onboarding".into());
        inputs.insert(
            "features".into(),
            InputValue::List(vec!["sign-up".into(), "profile".into()]),
        );
        inputs
    }

    fn banking_context() -> RetrievalContext {
        let mut context = general_context(DocumentType::Brd);
        context.domain = Domain::Banking;
        context.compliance_requirements = vec!["PCI DSS".into()];
        context
    }

    fn synthesizer(provider: impl GenerationProvider + 'static) -> ContentSynthesizer {
        ContentSynthesizer::new(Some(Arc::new(provider)), Duration::from_millis(100))
    }

    #[test]
    fn fences_are_stripped() {
        let body = accept_response("```markdown\n## Executive Summary\nText\n```").unwrap();
        assert_eq!(body, "## Executive Summary\nText");
        assert!(accept_response("```\n```").is_err());
        assert!(matches!(
            accept_response("hello world"),
            Err(DomainError::MalformedOutput(_))
        ));
    }

    #[test]
    fn params_follow_the_strategy() {
        let strategy =
            GenerationStrategy::new(Complexity::High, Enhancement::Expert, 0.4, Strictness::Strict);
        let params = completion_params(&strategy);
        assert!((params.temperature - 0.48).abs() < 1e-9);
        assert_eq!(params.max_tokens, 3000);
        assert_eq!(params.model_tier, ModelTier::Expert);
    }

    #[test]
    fn timeout_millis_saturate() {
        assert_eq!(millis(Duration::from_millis(250)), 250);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn template_document_is_deterministic_and_names_the_project() {
        let context = general_context(DocumentType::Frd);
        let first = template_document("Atlas", &inputs(), &context, None);
        let second = template_document("Atlas", &inputs(), &context, None);
        assert_eq!(first, second);
        assert!(first.body.contains("Atlas"));
        assert!(first.body.contains("FRD"));
        assert!(first.body.contains("I need sign-up"));
        assert!(first.footer.is_none());
    }

    #[test]
    fn prompt_carries_context_and_inputs() {
        let context = banking_context();
        let strategy = StrategyPlanner.plan("member onboarding", &context);
        let prompt = build_prompt("Atlas", &inputs(), &context, &strategy);
        assert!(prompt.contains("\"Atlas\""));
        assert!(prompt.contains("- PCI DSS"));
        assert!(prompt.contains("- **features**: sign-up, profile"));
        assert!(prompt.contains("Executive Summary, Project Scope"));
    }

    #[tokio::test]
    async fn provider_output_gets_a_footer() {
        let context = banking_context();
        let strategy = StrategyPlanner.plan("x", &context);
        let result = synthesizer(Scripted(Ok("## Executive Summary\nAll good")))
            .synthesize("Atlas", &inputs(), &context, &strategy)
            .await;

        assert_eq!(result.path, SynthesisPath::Provider);
        assert_eq!(result.body, "## Executive Summary\nAll good");
        assert!(result.content().ends_with("**Stakeholders:** Business Users, IT Team, Project Manager\n"));
    }

    #[tokio::test]
    async fn failures_degrade_to_the_template() {
        let context = banking_context();
        let strategy = StrategyPlanner.plan("x", &context);
        let expected = template_document("Atlas", &inputs(), &context, None).body;

        let failed = synthesizer(Scripted(Err("boom")))
            .synthesize("Atlas", &inputs(), &context, &strategy)
            .await;
        assert_eq!(failed.fallback_reason, Some(FallbackReason::ProviderError));
        assert_eq!(failed.body, expected);

        let malformed = synthesizer(Scripted(Ok("just chatter")))
            .synthesize("Atlas", &inputs(), &context, &strategy)
            .await;
        assert_eq!(malformed.fallback_reason, Some(FallbackReason::MalformedOutput));

        let slow = synthesizer(Sleepy)
            .synthesize("Atlas", &inputs(), &context, &strategy)
            .await;
        assert_eq!(slow.path, SynthesisPath::TemplateFallback);
        assert_eq!(slow.fallback_reason, Some(FallbackReason::Timeout));
    }

    #[tokio::test]
    async fn missing_provider_uses_the_template() {
        let context = general_context(DocumentType::Brd);
        let strategy = StrategyPlanner.plan("x", &context);
        let result = ContentSynthesizer::new(None, DEFAULT_GENERATION_TIMEOUT)
            .synthesize("Atlas", &inputs(), &context, &strategy)
            .await;
        assert_eq!(result.fallback_reason, Some(FallbackReason::NoProvider));
        assert!(result.content().contains("## Project Scope"));
    }
}
