use std::env;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use quiz_core::model::{ProficiencyLevel, Question};

use super::parse::parse_questions;
use super::prompt::{placement_prompt, practice_prompt};
use super::{BatchScope, QuestionProvider};
use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You write German language quiz questions for learners. \
     Every answer is machine-read: reply with JSON only, no prose and no markdown.";

/// Which kind of batch a completion is for. Placement asks for a spread of
/// levels and runs a little warmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchKind {
    Practice,
    Placement,
}

impl BatchKind {
    fn temperature(self) -> f32 {
        match self {
            Self::Practice => 0.4,
            Self::Placement => 0.5,
        }
    }
}

/// Connection settings for the question generator.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    api_key: String,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl LlmConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: completions_url(DEFAULT_BASE_URL),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads `QUIZ_AI_API_KEY`, `QUIZ_AI_BASE_URL`, `QUIZ_AI_MODEL` and
    /// `QUIZ_AI_TIMEOUT_SECS`. `None` when no key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = non_blank_var("QUIZ_AI_API_KEY")?;
        let mut config = Self::new(api_key);
        if let Some(base_url) = non_blank_var("QUIZ_AI_BASE_URL") {
            config = config.with_base_url(&base_url);
        }
        if let Some(model) = non_blank_var("QUIZ_AI_MODEL") {
            config = config.with_model(model);
        }
        if let Some(raw) = non_blank_var("QUIZ_AI_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => config = config.with_timeout(Duration::from_secs(secs)),
                Err(_) => warn!("ignoring QUIZ_AI_TIMEOUT_SECS={raw}: not a number"),
            }
        }
        Some(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.endpoint = completions_url(base_url);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim().trim_end_matches('/'))
}

/// Generates questions through an OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct LlmQuestionProvider {
    client: Client,
    config: Option<LlmConfig>,
}

impl LlmQuestionProvider {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LlmConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<LlmConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn complete(&self, prompt: &str, kind: BatchKind) -> Result<String, ProviderError> {
        let config = self.config.as_ref().ok_or(ProviderError::NotConfigured)?;
        let payload = QuestionRequest::new(&config.model, prompt, kind);

        let response = self
            .client
            .post(&config.endpoint)
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body: CompletionResponse = response.json().await?;
        let content = body.into_payload()?;
        debug!("completion received ({} bytes)", content.len());
        Ok(content)
    }
}

#[async_trait]
impl QuestionProvider for LlmQuestionProvider {
    async fn request_practice_questions(
        &self,
        level: ProficiencyLevel,
        count: u32,
    ) -> Result<Vec<Question>, ProviderError> {
        info!("requesting {count} practice questions for {}", level.code());
        let text = self
            .complete(&practice_prompt(level, count), BatchKind::Practice)
            .await?;
        parse_questions(&text, &BatchScope::Practice { level, count })
    }

    async fn request_placement_questions(
        &self,
        levels: &[ProficiencyLevel],
        count_per_level: u32,
    ) -> Result<Vec<Question>, ProviderError> {
        info!(
            "requesting placement questions: {} levels x {count_per_level}",
            levels.len()
        );
        let text = self
            .complete(
                &placement_prompt(levels, count_per_level),
                BatchKind::Placement,
            )
            .await?;
        parse_questions(
            &text,
            &BatchScope::Placement {
                levels: levels.to_vec(),
                count_per_level,
            },
        )
    }
}

fn status_error(status: StatusCode) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::QuotaExceeded,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized,
        other => ProviderError::HttpStatus(other),
    }
}

/// A chat-completions body: the fixed system instructions, one prompt.
#[derive(Debug, Serialize)]
struct QuestionRequest<'a> {
    model: &'a str,
    messages: [PromptMessage<'a>; 2],
    temperature: f32,
}

impl<'a> QuestionRequest<'a> {
    fn new(model: &'a str, prompt: &'a str, kind: BatchKind) -> Self {
        Self {
            model,
            messages: [
                PromptMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                PromptMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: kind.temperature(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PromptMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    /// The text of the first choice. A reply cut off at the token limit is
    /// still handed to the parser, which keeps whatever items survived.
    fn into_payload(self) -> Result<String, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedPayload("no completion choices".into()))?;
        if choice.finish_reason.as_deref() == Some("length") {
            warn!("question payload was truncated at the token limit");
        }
        choice
            .message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::MalformedPayload("empty completion".into()))
    }
}
