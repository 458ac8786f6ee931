//! Chat-completions client for any OpenAI-compatible endpoint.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    application::services::{CompletionParams, GenerationProvider, ModelTier},
    domain::DomainError,
};

const SYSTEM_PROMPT: &str =
    "You are a senior business analyst. Answer with a complete Markdown document and nothing else.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// Provider selected explicitly by configuration; the model is chosen by tier.
pub struct OpenAiCompatibleProvider {
    base_url: String,
    standard_model: String,
    expert_model: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        base_url: impl Into<String>,
        standard_model: impl Into<String>,
        expert_model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            standard_model: standard_model.into(),
            expert_model: expert_model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            agent,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Standard => &self.standard_model,
            ModelTier::Expert => &self.expert_model,
        }
    }

    fn request_body(&self, prompt: &str, params: &CompletionParams) -> serde_json::Value {
        json!({
            "model": self.model_for(params.model_tier),
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        })
    }
}

impl GenerationProvider for OpenAiCompatibleProvider {
    fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String, DomainError> {
        let mut request = self.agent.post(&self.endpoint());
        if let Some(key) = &self.api_key {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }

        debug!(
            target: "docsmith::generation",
            model = self.model_for(params.model_tier),
            max_tokens = params.max_tokens,
            "calling chat completions"
        );

        let response = request
            .send_json(self.request_body(prompt, params))
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => {
                    DomainError::generation(format!("provider answered with status {code}"))
                }
                ureq::Error::Transport(transport) => {
                    DomainError::generation(format!("provider unreachable: {transport}"))
                }
            })?;

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|err| DomainError::generation(format!("failed to parse response: {err}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| DomainError::malformed("response carried no message content"))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
