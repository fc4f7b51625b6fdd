//! OpenAI-compatible chat-completions summarizer.
//!
//! Sends the translated transcript to `/v1/chat/completions` with a
//! system prompt that demands a strict JSON object, then parses the first
//! choice's content into [`SummaryOutcome`]. Models love to wrap JSON in
//! markdown fences, so those are stripped before parsing.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use haven_core::summarize::Summarizer;
use haven_types::config::SummarizerConfig;
use haven_types::error::SummarizeError;
use haven_types::summary::{SummarizerMessage, SummaryOutcome};

const SYSTEM_PROMPT: &str = "\
You are a clinical documentation assistant. You will receive the full \
transcript of a counseling conversation between a counselor (assistant) \
and a client (user). Produce a JSON object with exactly these string \
fields: \"topic\" (the main subject of the session, required, non-empty), \
\"symptoms\" (what the client reports), \"treatment\" (what the counselor \
advised), \"counselor_note\" (a short note for the counselor's records), \
and \"next_schedule\" (the next appointment date as YYYY-MM-DD, or an \
empty string if none was agreed). Respond with the JSON object only.";

pub struct OpenAiCompatSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
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

/// Strip a markdown code fence (``` or ```json) around a JSON payload.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

impl OpenAiCompatSummarizer {
    pub fn new(config: &SummarizerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().map(SecretString::from),
        }
    }
}

impl Summarizer for OpenAiCompatSummarizer {
    async fn summarize(
        &self,
        messages: &[SummarizerMessage],
    ) -> Result<SummaryOutcome, SummarizeError> {
        let mut chat_messages = Vec::with_capacity(messages.len() + 1);
        chat_messages.push(ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        });
        for message in messages {
            chat_messages.push(ChatMessage {
                role: &message.role,
                content: &message.content,
            });
        }

        let request = ChatRequest {
            model: &self.model,
            messages: chat_messages,
            temperature: 0.3,
            max_tokens: 2000,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SummarizeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Http(format!(
                "summarizer returned {status}: {body}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Deserialization(e.to_string()))?;

        let Some(choice) = chat.choices.first() else {
            return Err(SummarizeError::MalformedResponse(
                "response contained no choices".to_string(),
            ));
        };

        let payload = extract_json(&choice.message.content);
        debug!(bytes = payload.len(), "parsing summarizer output");
        serde_json::from_str::<SummaryOutcome>(payload)
            .map_err(|e| SummarizeError::Deserialization(e.to_string()))
    }
}
