//! # LLM Grader
//!
//! [`LlmGrader`] grades a notebook through an OpenAI-compatible chat
//! completion endpoint.
//!
//! ## Retry policy
//!
//! - API keys are tried in the configured order.
//! - Each key gets up to `max_attempts` requests.
//! - A rate-limited reply (429) waits `backoff_secs * attempt` before the next try.
//! - Timeouts, connection errors and 5xx replies wait at most five seconds.
//! - Any other 4xx reply gives up on the key and moves to the next one.
//! - Once every key is exhausted the grader fails with [`MarkerError::UpstreamUnavailable`].
//!
//! The reply is expected to carry a JSON object somewhere in its text; the
//! slice between the first `{` and the last `}` is parsed. The total reported
//! by the model is ignored and recomputed from the sub-scores.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use util::config::GraderConfig;

use crate::error::MarkerError;
use crate::grading::prompt::{DEFAULT_EXERCISE_STATEMENT, SYSTEM_PROMPT, build_prompt};
use crate::grading::{Evaluation, EvaluationSource, SubScores};
use crate::notebook::Notebook;
use crate::traits::grader::Grader;

const MAX_TRANSIENT_WAIT_SECS: u64 = 5;

pub struct LlmGrader {
    client: reqwest::Client,
    config: GraderConfig,
    statement: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Scores as returned by the model. Missing categories count as zero.
#[derive(Deserialize)]
struct ModelReply {
    #[serde(default)]
    exploration: f64,
    #[serde(default)]
    preprocessing: f64,
    #[serde(default)]
    modeling: f64,
    #[serde(default)]
    evaluation: f64,
    #[serde(default)]
    documentation: f64,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
}

enum AttemptError {
    RateLimited,
    Transient(String),
    Rejected(String),
    Invalid(MarkerError),
}

impl LlmGrader {
    /// `statement` is the exercise statement embedded in the prompt; `None`
    /// uses [`DEFAULT_EXERCISE_STATEMENT`].
    pub fn new(config: GraderConfig, statement: Option<String>) -> Result<Self, MarkerError> {
        if config.api_keys.is_empty() {
            return Err(MarkerError::Config("no grader API keys configured".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MarkerError::Config(e.to_string()))?;

        Ok(Self {
            client,
            config,
            statement: statement.unwrap_or_else(|| DEFAULT_EXERCISE_STATEMENT.to_string()),
        })
    }

    async fn attempt(&self, key: &str, prompt: &str) -> Result<String, AttemptError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptError::Transient("request timed out".into())
                } else {
                    AttemptError::Transient(e.to_string())
                }
            })?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptError::RateLimited);
        }
        if status.is_server_error() {
            return Err(AttemptError::Transient(format!("HTTP {status}")));
        }
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(200).collect();
            return Err(AttemptError::Rejected(format!("HTTP {status}: {detail}")));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            AttemptError::Invalid(MarkerError::InvalidResponse(format!(
                "unexpected response body: {e}"
            )))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AttemptError::Invalid(MarkerError::InvalidResponse("reply has no content".into())))
    }
}

/// Extracts the evaluation JSON from the model's reply text.
pub fn parse_reply(content: &str) -> Result<Evaluation, MarkerError> {
    let json = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => &content[start..=end],
        _ => {
            return Err(MarkerError::InvalidResponse(
                "reply does not contain a JSON object".into(),
            ));
        }
    };

    let reply: ModelReply = serde_json::from_str(json)
        .map_err(|e| MarkerError::InvalidResponse(format!("reply JSON is not an evaluation: {e}")))?;

    Ok(Evaluation::from_parts(
        SubScores {
            exploration: reply.exploration,
            preprocessing: reply.preprocessing,
            modeling: reply.modeling,
            evaluation: reply.evaluation,
            documentation: reply.documentation,
        },
        reply.comment,
        reply.strengths,
        reply.improvements,
        EvaluationSource::Model,
    ))
}

#[async_trait]
impl Grader for LlmGrader {
    async fn grade(&self, notebook: &Notebook) -> Result<Evaluation, MarkerError> {
        let prompt = build_prompt(&self.statement, notebook);
        let max_attempts = self.config.max_attempts.max(1);
        let mut failures = Vec::new();

        for (key_index, key) in self.config.api_keys.iter().enumerate() {
            let key_no = key_index + 1;
            for attempt in 1..=max_attempts {
                match self.attempt(key, &prompt).await {
                    Ok(content) => {
                        let evaluation = parse_reply(&content)?;
                        tracing::info!(key = key_no, attempt, total = evaluation.total, "notebook graded");
                        return Ok(evaluation);
                    }
                    Err(AttemptError::RateLimited) => {
                        tracing::warn!(key = key_no, attempt, "grading service rate limited");
                        failures.push(format!("key {key_no} attempt {attempt}: rate limited"));
                        if attempt < max_attempts {
                            let wait = self.config.backoff_secs * u64::from(attempt);
                            tokio::time::sleep(Duration::from_secs(wait)).await;
                        }
                    }
                    Err(AttemptError::Transient(reason)) => {
                        tracing::warn!(key = key_no, attempt, %reason, "grading request failed");
                        failures.push(format!("key {key_no} attempt {attempt}: {reason}"));
                        if attempt < max_attempts {
                            let wait = self.config.backoff_secs.min(MAX_TRANSIENT_WAIT_SECS);
                            tokio::time::sleep(Duration::from_secs(wait)).await;
                        }
                    }
                    Err(AttemptError::Rejected(reason)) => {
                        tracing::warn!(key = key_no, %reason, "grading key rejected, trying next key");
                        failures.push(format!("key {key_no}: {reason}"));
                        break;
                    }
                    Err(AttemptError::Invalid(err)) => return Err(err),
                }
            }
        }

        tracing::error!(keys = self.config.api_keys.len(), "all grading keys exhausted");
        Err(MarkerError::UpstreamUnavailable(failures.join("; ")))
    }
}
