//! OpenAI chat-completions backend.
//!
//! One [`invoke`](crate::backend::GenerationBackend::invoke) is one chat
//! completion asked to answer in JSON with the three tutoring fields.
//! The request carries its own temperature; nothing on the backend is
//! mutated between calls. Timeouts and transient HTTP failures are
//! retried up to the configured budget before the last error surfaces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{BackendError, GenerationBackend, GenerationRequest, ReasoningStyle, SamplingParams};
use crate::config::Settings;
use crate::models::TutorReply;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_COMPLETION_TOKENS: u32 = 1000;

/// Chat-completions client for the OpenAI API.
pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    max_retries: u32,
}

impl OpenAiBackend {
    /// Build a backend from resolved [`Settings`].
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: settings.openai_api_key.clone(),
            model: settings.openai_model.clone(),
            timeout: settings.backend_timeout,
            max_retries: settings.backend_max_retries,
        }
    }

    /// Point the backend at a different API root (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// One HTTP exchange under the configured deadline. The bound covers
    /// the full round trip, body reads included, so a server that returns
    /// headers and then stalls the body still times out.
    async fn attempt(&self, body: &ChatRequest<'_>) -> Result<TutorReply, BackendError> {
        tokio::time::timeout(self.timeout, self.exchange(body))
            .await
            .map_err(|_| BackendError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
    }

    async fn exchange(&self, body: &ChatRequest<'_>) -> Result<TutorReply, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.trim().chars().take(200).collect();
            return Err(BackendError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| BackendError::MalformedOutput {
                reason: "response carried no choices".to_string(),
            })?;

        parse_reply(content)
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn invoke(
        &self,
        request: &GenerationRequest,
        params: SamplingParams,
    ) -> Result<TutorReply, BackendError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(request),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(request),
                },
            ],
            temperature: params.temperature,
            max_tokens: MAX_COMPLETION_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            match self.attempt(&body).await {
                Ok(reply) => {
                    debug!(attempt, temperature = params.temperature, "generation succeeded");
                    return Ok(reply);
                }
                Err(err) if attempt < self.max_retries && is_retryable(&err) => {
                    warn!(attempt, %err, "generation attempt failed; retrying");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        // Unreachable in practice: the loop either returns a reply or the
        // final attempt's error. Kept total for the compiler.
        Err(last_err.unwrap_or(BackendError::Timeout {
            timeout_secs: self.timeout.as_secs(),
        }))
    }
}

fn is_retryable(err: &BackendError) -> bool {
    match err {
        BackendError::Timeout { .. } | BackendError::Transport(_) => true,
        BackendError::Http { status, .. } => *status == 429 || *status >= 500,
        BackendError::MalformedOutput { .. } => false,
    }
}

// ── Prompt assembly ────────────────────────────────────────────────────

fn style_directive(style: ReasoningStyle) -> &'static str {
    match style {
        ReasoningStyle::DirectPrediction => "Respond directly and concisely.",
        ReasoningStyle::Stepwise => {
            "Reason through the underlying concept step by step before composing your response."
        }
        ReasoningStyle::StepSolver => {
            "Work the problem step by step internally, as if writing out a short solution program, \
             before composing your response. Do not reveal the worked solution."
        }
    }
}

fn system_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::from(
        "You are a Socratic tutor. Never answer the student's question directly. \
         Respond only with a JSON object containing exactly these keys:\n\
         - \"clarifying_question\": a thoughtful question that guides the student's \
         thinking and prompts deeper consideration of the topic\n\
         - \"concept_hint\": a subtle hint pointing toward relevant concepts without \
         revealing answers; suggest what to think about rather than explaining\n\
         - \"feedback\": encouraging and supportive feedback for the student\n",
    );
    prompt.push_str(style_directive(request.style));
    if let Some(knowledge) = &request.knowledge {
        prompt.push_str("\n\nRelevant domain knowledge:\n");
        prompt.push_str(knowledge);
    }
    prompt
}

fn user_prompt(request: &GenerationRequest) -> String {
    format!(
        "Subject: {}\nLevel: {}\nStudent question: {}",
        request.subject, request.level, request.question
    )
}

// ── Wire types ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

// ── Output parsing ─────────────────────────────────────────────────────

/// Parse the model's content string into a well-formed reply.
///
/// Tolerates a markdown code fence around the JSON, which some models
/// emit even under `json_object` response format.
fn parse_reply(content: &str) -> Result<TutorReply, BackendError> {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map_or(trimmed, |rest| rest.trim_end_matches("```"))
        .trim();

    let reply: TutorReply =
        serde_json::from_str(trimmed).map_err(|err| BackendError::MalformedOutput {
            reason: format!("not a three-field JSON object: {err}"),
        })?;

    if !reply.is_well_formed() {
        return Err(BackendError::MalformedOutput {
            reason: "one or more reply fields are blank".to_string(),
        });
    }
    Ok(reply)
}
